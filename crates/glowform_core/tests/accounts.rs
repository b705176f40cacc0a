use glowform_core::db::open_db_in_memory;
use glowform_core::repo::session_repo::{SessionRepository, SqliteSessionRepository};
use glowform_core::repo::user_repo::SqliteUserRepository;
use glowform_core::service::auth_service::SESSION_TTL_MS;
use glowform_core::{AuthService, AuthServiceError, Session, UserRole};
use rusqlite::Connection;

fn auth_service(conn: &Connection) -> AuthService<SqliteUserRepository<'_>, SqliteSessionRepository<'_>> {
    AuthService::new(
        SqliteUserRepository::try_new(conn).unwrap(),
        SqliteSessionRepository::try_new(conn).unwrap(),
    )
}

fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

#[test]
fn register_creates_unverified_user_with_hashed_password() {
    let conn = open_db_in_memory().unwrap();
    let service = auth_service(&conn);

    let user = service
        .register("Ada", " Ada@Example.com ", "s3cret-pass")
        .unwrap();
    assert_eq!(user.email, "ada@example.com");
    assert_eq!(user.role, UserRole::User);
    assert!(!user.is_verified);
    assert_ne!(user.password_hash, "s3cret-pass");
    assert!(user.password_hash.starts_with("v1$"));

    let json = serde_json::to_value(&user).unwrap();
    assert!(json.get("passwordHash").is_none());
    assert_eq!(json["role"], "USER");
}

#[test]
fn duplicate_email_is_rejected_and_keeps_one_row() {
    let conn = open_db_in_memory().unwrap();
    let service = auth_service(&conn);

    service.register("Ada", "ada@example.com", "first").unwrap();
    let err = service
        .register("Impostor", "ADA@example.com", "second")
        .unwrap_err();

    assert!(matches!(err, AuthServiceError::EmailTaken));
    assert_eq!(count_rows(&conn, "users"), 1);
}

#[test]
fn register_validates_input() {
    let conn = open_db_in_memory().unwrap();
    let service = auth_service(&conn);

    for (name, email, password) in [
        ("", "ada@example.com", "pw"),
        ("Ada", "", "pw"),
        ("Ada", "ada@example.com", ""),
        ("Ada", "not-an-email", "pw"),
    ] {
        let err = service.register(name, email, password).unwrap_err();
        assert!(matches!(err, AuthServiceError::InvalidInput(_)));
    }
    assert_eq!(count_rows(&conn, "users"), 0);
}

#[test]
fn login_authenticate_logout_cycle() {
    let conn = open_db_in_memory().unwrap();
    let service = auth_service(&conn);
    let registered = service.register("Ada", "ada@example.com", "pw").unwrap();

    let (user, session) = service.login("ADA@example.com", "pw").unwrap();
    assert_eq!(user.id, registered.id);
    assert_eq!(session.user_id, registered.id);
    assert_eq!(session.expires_at - session.created_at, SESSION_TTL_MS);
    assert_eq!(session.token.len(), 64);

    let resolved = service.authenticate(&session.token).unwrap();
    assert_eq!(resolved.id, registered.id);

    assert!(service.logout(&session.token).unwrap());
    assert!(!service.logout(&session.token).unwrap());
    assert!(matches!(
        service.authenticate(&session.token).unwrap_err(),
        AuthServiceError::Unauthenticated
    ));
}

#[test]
fn wrong_password_and_unknown_email_look_the_same() {
    let conn = open_db_in_memory().unwrap();
    let service = auth_service(&conn);
    service.register("Ada", "ada@example.com", "pw").unwrap();

    let wrong = service.login("ada@example.com", "nope").unwrap_err();
    let unknown = service.login("bob@example.com", "pw").unwrap_err();
    assert_eq!(wrong.to_string(), unknown.to_string());
    assert!(matches!(wrong, AuthServiceError::InvalidCredentials));
    assert_eq!(count_rows(&conn, "sessions"), 0);
}

#[test]
fn expired_sessions_do_not_authenticate_and_are_purged() {
    let conn = open_db_in_memory().unwrap();
    let service = auth_service(&conn);
    let user = service.register("Ada", "ada@example.com", "pw").unwrap();

    let sessions = SqliteSessionRepository::try_new(&conn).unwrap();
    sessions
        .create_session(&Session {
            token: "stale-token".to_string(),
            user_id: user.id,
            created_at: 0,
            expires_at: 1,
        })
        .unwrap();

    assert!(matches!(
        service.authenticate("stale-token").unwrap_err(),
        AuthServiceError::Unauthenticated
    ));
    assert_eq!(service.purge_expired_sessions().unwrap(), 1);
    assert_eq!(count_rows(&conn, "sessions"), 0);
}

#[test]
fn repositories_reject_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    assert!(SqliteUserRepository::try_new(&conn).is_err());
    assert!(SqliteSessionRepository::try_new(&conn).is_err());
}
