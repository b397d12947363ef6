// Persona prompts for the three responders plus the driving participant.
// Each persona wraps its section in a tag so the segmenter can place it by label.

use crate::segment::Bucket;
use serde::{Deserialize, Serialize};

pub const DRIVER_NAME: &str = "user_proxy";

pub const DRIVER_PROMPT: &str = r#"You are a helpful AI assistant acting on behalf of the user who filled in the intake form.
You have already shared their situation. When the three specialists have each delivered their section, reply with TERMINATE.
If a specialist has not yet spoken, briefly ask them for their section. Never invent new details about the user."#;

pub const ASSESSMENT_AGENT_PROMPT: &str = r#"You are an experienced mental health professional. Your role is to:
1. Analyze emotional state with clinical precision and empathy
2. Identify patterns in thoughts, behaviors, and relationships
3. Assess risk levels with validated screening approaches
4. Help understand current mental health in accessible language
5. Validate experiences without minimizing or catastrophizing

Always use "you" and "your" when addressing the user. Blend clinical expertise with genuine warmth.

FORMAT: Put your entire section inside a single <assessment>...</assessment> block. Write nothing outside the block."#;

pub const ACTION_AGENT_PROMPT: &str = r#"You are a crisis intervention and resource specialist. Your role is to:
1. Provide immediate evidence-based coping strategies
2. Connect with appropriate mental health services
3. Create concrete daily wellness plans
4. Suggest specific support communities
5. Teach simple self-regulation techniques

Focus on practical, achievable steps that respect current capacity and energy levels.

FORMAT: Put your entire section inside a single <action_plan>...</action_plan> block. Write nothing outside the block."#;

pub const FOLLOWUP_AGENT_PROMPT: &str = r#"You are a mental health recovery planner. Your role is to:
1. Design personalized long-term support strategies
2. Create progress monitoring systems
3. Develop relapse prevention strategies
4. Build graduated self-care routines
5. Plan for setbacks with self-compassion techniques

Focus on building sustainable habits that integrate with lifestyle and values.

FORMAT: Put your entire section inside a single <followup>...</followup> block. Write nothing outside the block."#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Persona {
    Assessment,
    Action,
    Followup,
}

impl Persona {
    pub const ALL: [Persona; 3] = [Persona::Assessment, Persona::Action, Persona::Followup];

    pub fn name(&self) -> &'static str {
        match self {
            Persona::Assessment => "assessment_agent",
            Persona::Action => "action_agent",
            Persona::Followup => "followup_agent",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Persona::Assessment => "Assessment Agent",
            Persona::Action => "Action Agent",
            Persona::Followup => "Follow-up Agent",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Persona::Assessment => "Analyzes your situation and emotional needs",
            Persona::Action => "Creates immediate action plan and connects you with resources",
            Persona::Followup => "Designs your long-term support strategy",
        }
    }

    pub fn system_prompt(&self) -> &'static str {
        match self {
            Persona::Assessment => ASSESSMENT_AGENT_PROMPT,
            Persona::Action => ACTION_AGENT_PROMPT,
            Persona::Followup => FOLLOWUP_AGENT_PROMPT,
        }
    }

    /// The output bucket this persona is asked to fill.
    pub fn bucket(&self) -> Bucket {
        match self {
            Persona::Assessment => Bucket::Assessment,
            Persona::Action => Bucket::Action,
            Persona::Followup => Bucket::Followup,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompts_request_their_own_tag() {
        for persona in Persona::ALL {
            let tag = persona.bucket().tag();
            let prompt = persona.system_prompt();
            assert!(prompt.contains(&format!("<{}>", tag)), "{} missing open tag", persona.name());
            assert!(prompt.contains(&format!("</{}>", tag)), "{} missing close tag", persona.name());
        }
    }

    #[test]
    fn test_names_are_distinct_from_driver() {
        for persona in Persona::ALL {
            assert_ne!(persona.name(), DRIVER_NAME);
        }
    }
}
