use crate::segment::Bucket;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const SLEEP_HOURS_MAX: u8 = 12;
pub const STRESS_MIN: u8 = 1;
pub const STRESS_MAX: u8 = 10;

// ============ Bounded Scores ============

/// Hours of sleep per night, 0 through 12.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SleepHours(u8);

impl SleepHours {
    pub fn new(hours: u8) -> Option<Self> {
        (hours <= SLEEP_HOURS_MAX).then_some(Self(hours))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for SleepHours {
    fn default() -> Self {
        Self(7)
    }
}

impl TryFrom<u8> for SleepHours {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("sleep hours must be 0-{}, got {}", SLEEP_HOURS_MAX, value))
    }
}

impl From<SleepHours> for u8 {
    fn from(value: SleepHours) -> Self {
        value.0
    }
}

impl fmt::Display for SleepHours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Self-reported stress, 1 through 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct StressLevel(u8);

impl StressLevel {
    pub fn new(level: u8) -> Option<Self> {
        (STRESS_MIN..=STRESS_MAX).contains(&level).then_some(Self(level))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for StressLevel {
    fn default() -> Self {
        Self(5)
    }
}

impl TryFrom<u8> for StressLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
            .ok_or_else(|| format!("stress level must be {}-{}, got {}", STRESS_MIN, STRESS_MAX, value))
    }
}

impl From<StressLevel> for u8 {
    fn from(value: StressLevel) -> Self {
        value.0
    }
}

impl fmt::Display for StressLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============ Fixed Label Sets ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SupportKind {
    Family,
    Friends,
    Therapist,
    #[serde(rename = "Support Groups")]
    SupportGroups,
    None,
}

impl SupportKind {
    pub const ALL: [SupportKind; 5] = [
        SupportKind::Family,
        SupportKind::Friends,
        SupportKind::Therapist,
        SupportKind::SupportGroups,
        SupportKind::None,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SupportKind::Family => "Family",
            SupportKind::Friends => "Friends",
            SupportKind::Therapist => "Therapist",
            SupportKind::SupportGroups => "Support Groups",
            SupportKind::None => "None",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Symptom {
    Anxiety,
    Depression,
    Insomnia,
    Fatigue,
    #[serde(rename = "Loss of Interest")]
    LossOfInterest,
    #[serde(rename = "Difficulty Concentrating")]
    DifficultyConcentrating,
    #[serde(rename = "Changes in Appetite")]
    ChangesInAppetite,
    #[serde(rename = "Social Withdrawal")]
    SocialWithdrawal,
    #[serde(rename = "Mood Swings")]
    MoodSwings,
    #[serde(rename = "Physical Discomfort")]
    PhysicalDiscomfort,
}

impl Symptom {
    pub const ALL: [Symptom; 10] = [
        Symptom::Anxiety,
        Symptom::Depression,
        Symptom::Insomnia,
        Symptom::Fatigue,
        Symptom::LossOfInterest,
        Symptom::DifficultyConcentrating,
        Symptom::ChangesInAppetite,
        Symptom::SocialWithdrawal,
        Symptom::MoodSwings,
        Symptom::PhysicalDiscomfort,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Symptom::Anxiety => "Anxiety",
            Symptom::Depression => "Depression",
            Symptom::Insomnia => "Insomnia",
            Symptom::Fatigue => "Fatigue",
            Symptom::LossOfInterest => "Loss of Interest",
            Symptom::DifficultyConcentrating => "Difficulty Concentrating",
            Symptom::ChangesInAppetite => "Changes in Appetite",
            Symptom::SocialWithdrawal => "Social Withdrawal",
            Symptom::MoodSwings => "Mood Swings",
            Symptom::PhysicalDiscomfort => "Physical Discomfort",
        }
    }
}

// ============ Intake Form ============

/// One render pass worth of user input. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeForm {
    pub mood: String,
    pub sleep_hours: SleepHours,
    pub stress_level: StressLevel,
    /// In selection order.
    pub support_system: Vec<SupportKind>,
    pub recent_changes: String,
    /// In selection order.
    pub symptoms: Vec<Symptom>,
}

// ============ Form Options (sent to the webview) ============

#[derive(Debug, Serialize)]
pub struct IntakeOptions {
    pub sleep_hours: Vec<u8>,
    pub stress_min: u8,
    pub stress_max: u8,
    pub default_sleep_hours: u8,
    pub default_stress_level: u8,
    pub support_system: Vec<&'static str>,
    pub symptoms: Vec<&'static str>,
    pub team: Vec<TeamMember>,
    pub crisis_notice: CrisisNotice,
}

#[derive(Debug, Serialize)]
pub struct TeamMember {
    pub name: &'static str,
    pub section: Bucket,
    pub title: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Serialize)]
pub struct CrisisNotice {
    pub summary: &'static str,
    pub resources: Vec<CrisisResource>,
}

#[derive(Debug, Serialize)]
pub struct CrisisResource {
    pub label: &'static str,
    pub contact: &'static str,
    pub url: Option<&'static str>,
}

impl IntakeOptions {
    pub fn build() -> Self {
        Self {
            sleep_hours: (0..=SLEEP_HOURS_MAX).collect(),
            stress_min: STRESS_MIN,
            stress_max: STRESS_MAX,
            default_sleep_hours: SleepHours::default().get(),
            default_stress_level: StressLevel::default().get(),
            support_system: SupportKind::ALL.iter().map(|s| s.label()).collect(),
            symptoms: Symptom::ALL.iter().map(|s| s.label()).collect(),
            team: crate::personas::Persona::ALL
                .iter()
                .map(|p| TeamMember {
                    name: p.name(),
                    section: p.bucket(),
                    title: p.title(),
                    description: p.description(),
                })
                .collect(),
            crisis_notice: CrisisNotice {
                summary: "This application is a supportive tool and does not replace professional \
                          mental health care. If you're experiencing thoughts of self-harm or severe crisis:",
                resources: vec![
                    CrisisResource {
                        label: "National Crisis Hotline",
                        contact: "988",
                        url: Some("https://988lifeline.org"),
                    },
                    CrisisResource {
                        label: "Emergency Services",
                        contact: "911",
                        url: None,
                    },
                ],
            },
        }
    }
}
