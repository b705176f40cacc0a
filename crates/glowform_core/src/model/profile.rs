//! Business profile wizard model.
//!
//! # Responsibility
//! - Hold one typed payload per wizard step.
//! - Drive step navigation, partial updates and completion.
//!
//! # Invariants
//! - The current step index always stays within `WizardStep::ALL`.
//! - Partial updates only overwrite fields that are provided.
//! - The profile can only be submitted from the final step.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Declares a closed choice list whose wire form is its display label.
macro_rules! choice_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $label)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }
    };
}

choice_enum!(
    /// Industry tiles on the business information step.
    Industry {
        Retail => "Retail",
        Tech => "Tech",
        Health => "Health",
        Finance => "Finance",
        Education => "Education",
        Other => "Other",
    }
);

choice_enum!(
    CustomerSegment {
        Youth => "Youth",
        Adults => "Adults",
        Seniors => "Seniors",
        Families => "Families",
        Professionals => "Professionals",
        Students => "Students",
    }
);

choice_enum!(
    FeedbackType {
        CustomerSatisfaction => "Customer Satisfaction",
        ProductReviews => "Product Reviews",
        UsageStatistics => "Usage Statistics",
        SupportTickets => "Support Tickets",
    }
);

choice_enum!(
    FeedbackSource {
        Surveys => "Surveys",
        ECommercePlatforms => "E-commerce Platforms",
        SocialMedia => "Social Media",
        CustomerSupport => "Customer Support",
    }
);

choice_enum!(
    CollectionFrequency {
        Daily => "Daily",
        Weekly => "Weekly",
        Monthly => "Monthly",
        Quarterly => "Quarterly",
    }
);

choice_enum!(
    ChartType {
        BarCharts => "Bar Charts",
        LineGraphs => "Line Graphs",
        PieCharts => "Pie Charts",
        Heatmaps => "Heatmaps",
        ScatterPlots => "Scatter Plots",
    }
);

choice_enum!(
    LayoutPreference {
        Minimalist => "Minimalist",
        Detailed => "Detailed",
        GoalOriented => "Goal-oriented",
    }
);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessInfo {
    pub business_name: Option<String>,
    pub industry: Option<Industry>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInsights {
    pub products: Option<String>,
    pub features: Option<String>,
    pub target_segments: Option<Vec<CustomerSegment>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackData {
    pub feedback_types: Option<Vec<FeedbackType>>,
    pub feedback_sources: Option<Vec<FeedbackSource>>,
    pub collection_frequency: Option<CollectionFrequency>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualizationPreferences {
    pub chart_types: Option<Vec<ChartType>>,
    pub key_metrics: Option<String>,
    pub layout_preference: Option<LayoutPreference>,
}

/// Partial payload for one step, tagged by step name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", content = "data", rename_all = "camelCase")]
pub enum StepData {
    BusinessInfo(BusinessInfo),
    ProductInsights(ProductInsights),
    FeedbackData(FeedbackData),
    VisualizationPreferences(VisualizationPreferences),
}

impl StepData {
    pub fn step(&self) -> WizardStep {
        match self {
            Self::BusinessInfo(_) => WizardStep::BusinessInfo,
            Self::ProductInsights(_) => WizardStep::ProductInsights,
            Self::FeedbackData(_) => WizardStep::FeedbackData,
            Self::VisualizationPreferences(_) => WizardStep::VisualizationPreferences,
        }
    }
}

/// Complete profile collected by the wizard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessProfile {
    pub business_info: BusinessInfo,
    pub product_insights: ProductInsights,
    pub feedback_data: FeedbackData,
    pub visualization_preferences: VisualizationPreferences,
}

impl BusinessProfile {
    /// Merges a partial step payload; `None` fields keep their old value.
    pub fn merge(&mut self, update: StepData) {
        match update {
            StepData::BusinessInfo(data) => {
                let target = &mut self.business_info;
                overwrite(&mut target.business_name, data.business_name);
                overwrite(&mut target.industry, data.industry);
                overwrite(&mut target.location, data.location);
            }
            StepData::ProductInsights(data) => {
                let target = &mut self.product_insights;
                overwrite(&mut target.products, data.products);
                overwrite(&mut target.features, data.features);
                overwrite(&mut target.target_segments, data.target_segments);
            }
            StepData::FeedbackData(data) => {
                let target = &mut self.feedback_data;
                overwrite(&mut target.feedback_types, data.feedback_types);
                overwrite(&mut target.feedback_sources, data.feedback_sources);
                overwrite(&mut target.collection_frequency, data.collection_frequency);
            }
            StepData::VisualizationPreferences(data) => {
                let target = &mut self.visualization_preferences;
                overwrite(&mut target.chart_types, data.chart_types);
                overwrite(&mut target.key_metrics, data.key_metrics);
                overwrite(&mut target.layout_preference, data.layout_preference);
            }
        }
    }
}

fn overwrite<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

/// Adds `value` when absent, removes it when present.
pub fn toggle_choice<T: PartialEq>(selection: &mut Option<Vec<T>>, value: T) {
    let items = selection.get_or_insert_with(Vec::new);
    if let Some(index) = items.iter().position(|item| *item == value) {
        items.remove(index);
    } else {
        items.push(value);
    }
}

/// Wizard steps in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WizardStep {
    BusinessInfo,
    ProductInsights,
    FeedbackData,
    VisualizationPreferences,
}

impl WizardStep {
    pub const ALL: [WizardStep; 4] = [
        WizardStep::BusinessInfo,
        WizardStep::ProductInsights,
        WizardStep::FeedbackData,
        WizardStep::VisualizationPreferences,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Self::BusinessInfo => "Business Information",
            Self::ProductInsights => "Product Insights",
            Self::FeedbackData => "Feedback Data Preferences",
            Self::VisualizationPreferences => "Data Visualization Preferences",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardError {
    /// Submit was requested before reaching the last step.
    NotOnFinalStep(WizardStep),
    /// The profile was already submitted.
    AlreadyCompleted,
}

impl Display for WizardError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotOnFinalStep(step) => {
                write!(f, "profile can only be submitted from the last step, currently on `{}`", step.title())
            }
            Self::AlreadyCompleted => write!(f, "profile was already submitted"),
        }
    }
}

impl Error for WizardError {}

/// Multi-step profile creation state machine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileWizard {
    current: usize,
    profile: BusinessProfile,
    completed: bool,
}

impl ProfileWizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_step(&self) -> WizardStep {
        WizardStep::ALL[self.current]
    }

    pub fn profile(&self) -> &BusinessProfile {
        &self.profile
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Advances one step. Returns `false` on the last step.
    pub fn next(&mut self) -> bool {
        if self.current + 1 < WizardStep::ALL.len() {
            self.current += 1;
            true
        } else {
            false
        }
    }

    /// Goes back one step. Returns `false` on the first step.
    pub fn prev(&mut self) -> bool {
        if self.current > 0 {
            self.current -= 1;
            true
        } else {
            false
        }
    }

    /// Merges a partial payload for any step.
    pub fn update(&mut self, data: StepData) {
        self.profile.merge(data);
    }

    /// Progress through the steps as an integer percentage.
    pub fn progress(&self) -> u8 {
        let last = WizardStep::ALL.len() - 1;
        // current <= last, so the result is at most 100.
        (self.current * 100 / last) as u8
    }

    /// Finishes the wizard and returns the collected profile.
    pub fn submit(&mut self) -> Result<&BusinessProfile, WizardError> {
        if self.completed {
            return Err(WizardError::AlreadyCompleted);
        }
        if self.current + 1 != WizardStep::ALL.len() {
            return Err(WizardError::NotOnFinalStep(self.current_step()));
        }
        self.completed = true;
        Ok(&self.profile)
    }
}
