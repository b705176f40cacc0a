use glowform_core::model::profile::{
    toggle_choice, BusinessInfo, ChartType, FeedbackData, Industry, VisualizationPreferences,
    WizardError,
};
use glowform_core::{ProfileWizard, StepData, WizardStep};
use serde_json::json;

#[test]
fn navigation_stays_within_steps() {
    let mut wizard = ProfileWizard::new();
    assert_eq!(wizard.current_step(), WizardStep::BusinessInfo);
    assert_eq!(wizard.progress(), 0);
    assert!(!wizard.prev());

    assert!(wizard.next());
    assert_eq!(wizard.progress(), 33);
    assert!(wizard.next());
    assert!(wizard.next());
    assert_eq!(wizard.current_step(), WizardStep::VisualizationPreferences);
    assert_eq!(wizard.progress(), 100);
    assert!(!wizard.next());

    assert!(wizard.prev());
    assert_eq!(wizard.current_step(), WizardStep::FeedbackData);
}

#[test]
fn partial_updates_keep_earlier_values() {
    let mut wizard = ProfileWizard::new();
    wizard.update(StepData::BusinessInfo(BusinessInfo {
        business_name: Some("Glow Cafe".to_string()),
        industry: Some(Industry::Retail),
        location: None,
    }));
    wizard.update(StepData::BusinessInfo(BusinessInfo {
        location: Some("Lisbon".to_string()),
        ..BusinessInfo::default()
    }));

    let info = &wizard.profile().business_info;
    assert_eq!(info.business_name.as_deref(), Some("Glow Cafe"));
    assert_eq!(info.industry, Some(Industry::Retail));
    assert_eq!(info.location.as_deref(), Some("Lisbon"));
}

#[test]
fn submit_only_from_last_step_and_once() {
    let mut wizard = ProfileWizard::new();
    assert_eq!(
        wizard.submit().unwrap_err(),
        WizardError::NotOnFinalStep(WizardStep::BusinessInfo)
    );

    while wizard.next() {}
    wizard.update(StepData::VisualizationPreferences(VisualizationPreferences {
        chart_types: Some(vec![ChartType::BarCharts]),
        ..VisualizationPreferences::default()
    }));
    let profile = wizard.submit().unwrap().clone();
    assert_eq!(
        profile.visualization_preferences.chart_types,
        Some(vec![ChartType::BarCharts])
    );
    assert!(wizard.is_completed());
    assert_eq!(wizard.submit().unwrap_err(), WizardError::AlreadyCompleted);
}

#[test]
fn toggle_choice_adds_then_removes() {
    let mut selection = None;
    toggle_choice(&mut selection, ChartType::Heatmaps);
    toggle_choice(&mut selection, ChartType::PieCharts);
    assert_eq!(
        selection,
        Some(vec![ChartType::Heatmaps, ChartType::PieCharts])
    );
    toggle_choice(&mut selection, ChartType::Heatmaps);
    assert_eq!(selection, Some(vec![ChartType::PieCharts]));
}

#[test]
fn step_data_uses_tagged_wire_form() {
    let data: StepData = serde_json::from_value(json!({
        "step": "feedbackData",
        "data": { "feedbackSources": ["E-commerce Platforms"], "collectionFrequency": "Weekly" }
    }))
    .unwrap();
    assert_eq!(data.step(), WizardStep::FeedbackData);
    let StepData::FeedbackData(FeedbackData {
        feedback_sources, ..
    }) = data
    else {
        panic!("expected feedback data");
    };
    assert_eq!(feedback_sources.map(|items| items.len()), Some(1));
}
