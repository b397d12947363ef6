use crate::config::AppConfig;
use crate::error::{Result, WellbeingError};
use crate::logging;
use crate::openai::{ChatBackend, ChatMessage};
use crate::personas::{Persona, DRIVER_NAME, DRIVER_PROMPT};
use serde::{Deserialize, Serialize};

pub const TERMINATION_MARKER: &str = "TERMINATE";

// ============ Transcript ============

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    #[default]
    User,
    Assistant,
}

impl TurnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnRole::User => "user",
            TurnRole::Assistant => "assistant",
        }
    }
}

/// One attributed message in the group chat.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub name: String,
    pub content: String,
}

// ============ Participants ============

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeakerSelection {
    /// A selector completion names the next speaker.
    Auto,
    RoundRobin,
}

impl SpeakerSelection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpeakerSelection::Auto => "auto",
            SpeakerSelection::RoundRobin => "round_robin",
        }
    }

    pub fn from_str(s: &str) -> Option<SpeakerSelection> {
        match s.to_lowercase().as_str() {
            "auto" => Some(SpeakerSelection::Auto),
            "round_robin" | "round-robin" => Some(SpeakerSelection::RoundRobin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipantKind {
    Persona,
    /// Speaks for the user without human input; stops after `max_consecutive_auto_reply` replies.
    Driver { max_consecutive_auto_reply: u32 },
}

#[derive(Debug, Clone)]
pub struct Participant {
    pub name: String,
    pub system_message: String,
    pub kind: ParticipantKind,
}

impl Participant {
    pub fn persona(persona: Persona) -> Self {
        Self {
            name: persona.name().to_string(),
            system_message: persona.system_prompt().to_string(),
            kind: ParticipantKind::Persona,
        }
    }

    pub fn driver(max_consecutive_auto_reply: u32) -> Self {
        Self {
            name: DRIVER_NAME.to_string(),
            system_message: DRIVER_PROMPT.to_string(),
            kind: ParticipantKind::Driver { max_consecutive_auto_reply },
        }
    }

    fn role(&self) -> TurnRole {
        match self.kind {
            ParticipantKind::Persona => TurnRole::Assistant,
            ParticipantKind::Driver { .. } => TurnRole::User,
        }
    }

    fn reply_budget(&self) -> Option<u32> {
        match self.kind {
            ParticipantKind::Persona => None,
            ParticipantKind::Driver { max_consecutive_auto_reply } => Some(max_consecutive_auto_reply),
        }
    }
}

// ============ Group Chat ============

pub struct GroupChat {
    participants: Vec<Participant>,
    max_round: usize,
    selection: SpeakerSelection,
}

impl GroupChat {
    pub fn new(participants: Vec<Participant>, max_round: usize, selection: SpeakerSelection) -> Self {
        Self {
            participants,
            max_round,
            selection,
        }
    }

    /// The driver plus the assessment, action and follow-up personas.
    pub fn wellbeing_team(config: &AppConfig) -> Self {
        let mut participants = vec![Participant::driver(config.max_consecutive_auto_reply)];
        participants.extend(Persona::ALL.iter().map(|p| Participant::persona(*p)));
        Self::new(participants, config.max_round, config.speaker_selection)
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// Run the whole exchange. The task message counts as the first round.
    pub async fn run(
        &self,
        backend: &dyn ChatBackend,
        task: &str,
        session_id: Option<&str>,
    ) -> Result<Vec<ConversationTurn>> {
        if self.participants.is_empty() {
            return Err(WellbeingError::NoParticipants);
        }

        let initiator = self
            .participants
            .iter()
            .position(|p| matches!(p.kind, ParticipantKind::Driver { .. }))
            .unwrap_or(0);

        let mut transcript = vec![ConversationTurn {
            role: self.participants[initiator].role(),
            name: self.participants[initiator].name.clone(),
            content: task.to_string(),
        }];
        let mut replies = vec![0u32; self.participants.len()];
        let mut last = initiator;

        while transcript.len() < self.max_round {
            let eligible = self.eligible_speakers(last, &replies);
            if eligible.is_empty() {
                logging::log_routing(session_id, "No eligible speaker left, ending chat");
                break;
            }

            let next = match self.selection {
                SpeakerSelection::RoundRobin => self.round_robin(last, &eligible),
                SpeakerSelection::Auto => self.select_auto(backend, last, &eligible, &transcript, session_id).await?,
            };
            let speaker = &self.participants[next];

            let reply = backend
                .chat_completion(self.messages_for(speaker, &transcript))
                .await?;
            replies[next] += 1;

            logging::log_agent(
                session_id,
                &format!(
                    "{} [{}] replied ({} chars, round {})",
                    speaker.name,
                    speaker.role().as_str(),
                    reply.len(),
                    transcript.len() + 1
                ),
            );

            let terminate = is_termination(&reply);
            transcript.push(ConversationTurn {
                role: speaker.role(),
                name: speaker.name.clone(),
                content: reply,
            });

            if terminate {
                logging::log_routing(session_id, &format!("{} requested termination", speaker.name));
                break;
            }
            last = next;
        }

        Ok(transcript)
    }

    fn eligible_speakers(&self, last: usize, replies: &[u32]) -> Vec<usize> {
        let available: Vec<usize> = (0..self.participants.len())
            .filter(|&i| match self.participants[i].reply_budget() {
                Some(budget) => replies[i] < budget,
                None => true,
            })
            .collect();

        let others: Vec<usize> = available.iter().copied().filter(|&i| i != last).collect();
        if others.is_empty() {
            available
        } else {
            others
        }
    }

    fn round_robin(&self, last: usize, eligible: &[usize]) -> usize {
        let n = self.participants.len();
        (1..=n)
            .map(|step| (last + step) % n)
            .find(|idx| eligible.contains(idx))
            .unwrap_or(eligible[0])
    }

    async fn select_auto(
        &self,
        backend: &dyn ChatBackend,
        last: usize,
        eligible: &[usize],
        transcript: &[ConversationTurn],
        session_id: Option<&str>,
    ) -> Result<usize> {
        if eligible.len() == 1 {
            return Ok(eligible[0]);
        }

        let answer = backend
            .chat_completion(self.selector_messages(eligible, transcript))
            .await?;

        match self.parse_selection(&answer, eligible) {
            Some(idx) => {
                logging::log_routing(session_id, &format!("Selected {}", self.participants[idx].name));
                Ok(idx)
            }
            None => {
                let idx = self.round_robin(last, eligible);
                logging::log_routing(
                    session_id,
                    &format!(
                        "Selector answer named no eligible speaker, falling back to {}",
                        self.participants[idx].name
                    ),
                );
                Ok(idx)
            }
        }
    }

    fn selector_messages(&self, eligible: &[usize], transcript: &[ConversationTurn]) -> Vec<ChatMessage> {
        let roles = self
            .participants
            .iter()
            .map(|p| {
                let summary = p.system_message.lines().next().unwrap_or_default();
                format!("{}: {}", p.name, summary)
            })
            .collect::<Vec<_>>()
            .join("\n");

        let candidates = eligible
            .iter()
            .map(|&i| self.participants[i].name.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        let history = transcript
            .iter()
            .map(|t| format!("{}: {}", t.name, t.content))
            .collect::<Vec<_>>()
            .join("\n\n");

        vec![
            ChatMessage::system(&format!(
                "You are in a role play game. The following roles are available:\n{}\n\nRead the following conversation. Then select the next role from [{}] to play. Only return the role.",
                roles, candidates
            )),
            ChatMessage::user(&format!(
                "CONVERSATION:\n{}\n\nRead the above conversation. Then select the next role from [{}] to play. Only return the role.",
                history, candidates
            )),
        ]
    }

    /// Exactly one eligible name must be mentioned.
    fn parse_selection(&self, answer: &str, eligible: &[usize]) -> Option<usize> {
        let answer = answer.to_lowercase();
        let mentioned: Vec<usize> = eligible
            .iter()
            .copied()
            .filter(|&i| answer.contains(&self.participants[i].name.to_lowercase()))
            .collect();

        match mentioned.as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }

    fn messages_for(&self, speaker: &Participant, transcript: &[ConversationTurn]) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(transcript.len() + 1);
        messages.push(ChatMessage::system(&speaker.system_message));

        for turn in transcript {
            if turn.name == speaker.name {
                messages.push(ChatMessage {
                    role: "assistant".to_string(),
                    content: turn.content.clone(),
                    name: None,
                });
            } else {
                messages.push(ChatMessage {
                    role: "user".to_string(),
                    content: turn.content.clone(),
                    name: Some(turn.name.clone()),
                });
            }
        }

        messages
    }
}

pub fn is_termination(content: &str) -> bool {
    content.trim_end().ends_with(TERMINATION_MARKER)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned completions and records every request.
    pub(crate) struct ScriptedBackend {
        replies: Mutex<VecDeque<Result<String>>>,
        pub(crate) requests: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl ScriptedBackend {
        pub(crate) fn new(replies: Vec<Result<String>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn ok(replies: &[&str]) -> Self {
            Self::new(replies.iter().map(|r| Ok(r.to_string())).collect())
        }
    }

    #[async_trait]
    impl ChatBackend for ScriptedBackend {
        async fn chat_completion(&self, messages: Vec<ChatMessage>) -> Result<String> {
            self.requests.lock().unwrap().push(messages);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok("nothing more to add".to_string()))
        }
    }

    fn round_robin_team(max_round: usize, max_auto_reply: u32) -> GroupChat {
        let config = AppConfig {
            max_round,
            max_consecutive_auto_reply: max_auto_reply,
            speaker_selection: SpeakerSelection::RoundRobin,
            ..AppConfig::default()
        };
        GroupChat::wellbeing_team(&config)
    }

    fn speakers(transcript: &[ConversationTurn]) -> Vec<&str> {
        transcript.iter().map(|t| t.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_round_robin_stops_at_max_round() {
        let chat = round_robin_team(5, 10);
        let backend = ScriptedBackend::ok(&["a", "b", "c", "d", "e"]);

        let transcript = chat.run(&backend, "task", None).await.unwrap();

        assert_eq!(transcript.len(), 5);
        assert_eq!(
            speakers(&transcript),
            vec!["user_proxy", "assessment_agent", "action_agent", "followup_agent", "user_proxy"]
        );
        assert_eq!(transcript[0].content, "task");
        assert_eq!(transcript[0].role, TurnRole::User);
        assert_eq!(transcript[1].role, TurnRole::Assistant);
        assert_eq!(transcript[4].role, TurnRole::User);
    }

    #[tokio::test]
    async fn test_termination_marker_ends_chat() {
        let chat = round_robin_team(15, 10);
        let backend = ScriptedBackend::ok(&["a", "b", "c", "Thanks, all covered. TERMINATE\n"]);

        let transcript = chat.run(&backend, "task", None).await.unwrap();

        assert_eq!(transcript.len(), 5);
        assert!(is_termination(&transcript[4].content));
        assert_eq!(backend.requests.lock().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_driver_respects_reply_budget() {
        let chat = round_robin_team(12, 1);
        let backend = ScriptedBackend::ok(&[]);

        let transcript = chat.run(&backend, "task", None).await.unwrap();

        let driver_replies = transcript[1..].iter().filter(|t| t.name == DRIVER_NAME).count();
        assert_eq!(driver_replies, 1);
        assert_eq!(transcript.len(), 12);
    }

    #[tokio::test]
    async fn test_speaker_sees_own_turns_as_assistant() {
        let chat = round_robin_team(6, 10);
        let backend = ScriptedBackend::ok(&["first assessment", "plan", "later", "go on", "second assessment"]);

        chat.run(&backend, "task", None).await.unwrap();

        let requests = backend.requests.lock().unwrap();
        let second_assessment = &requests[4];
        assert_eq!(second_assessment[0].role, "system");
        assert!(second_assessment[0].content.contains("mental health professional"));
        assert_eq!(second_assessment[1].name.as_deref(), Some("user_proxy"));
        assert_eq!(second_assessment[2].role, "assistant");
        assert_eq!(second_assessment[2].content, "first assessment");
        assert!(second_assessment[2].name.is_none());
        assert_eq!(second_assessment[3].name.as_deref(), Some("action_agent"));
    }

    #[tokio::test]
    async fn test_auto_selection_follows_selector() {
        let config = AppConfig {
            max_round: 3,
            ..AppConfig::default()
        };
        let chat = GroupChat::wellbeing_team(&config);
        let backend = ScriptedBackend::ok(&[
            "followup_agent",
            "long-term plan",
            "I think the assessment_agent",
            "assessment",
        ]);

        let transcript = chat.run(&backend, "task", None).await.unwrap();

        assert_eq!(speakers(&transcript), vec!["user_proxy", "followup_agent", "assessment_agent"]);
        let requests = backend.requests.lock().unwrap();
        assert!(requests[0][0].content.contains("role play game"));
        assert!(requests[2][1].content.contains("[user_proxy, assessment_agent, action_agent]"));
    }

    #[tokio::test]
    async fn test_auto_selection_falls_back_to_round_robin() {
        let config = AppConfig {
            max_round: 2,
            ..AppConfig::default()
        };
        let chat = GroupChat::wellbeing_team(&config);
        let backend = ScriptedBackend::ok(&["either action_agent or followup_agent", "assessment"]);

        let transcript = chat.run(&backend, "task", None).await.unwrap();

        assert_eq!(speakers(&transcript), vec!["user_proxy", "assessment_agent"]);
    }

    #[tokio::test]
    async fn test_backend_error_propagates() {
        let chat = round_robin_team(15, 10);
        let backend = ScriptedBackend::new(vec![
            Ok("assessment".to_string()),
            Err(WellbeingError::Api {
                status: 500,
                body: "boom".to_string(),
            }),
        ]);

        let err = chat.run(&backend, "task", None).await.unwrap_err();
        assert!(matches!(err, WellbeingError::Api { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_empty_chat_is_an_error() {
        let chat = GroupChat::new(Vec::new(), 5, SpeakerSelection::RoundRobin);
        let backend = ScriptedBackend::ok(&[]);
        assert!(matches!(
            chat.run(&backend, "task", None).await,
            Err(WellbeingError::NoParticipants)
        ));
    }

    #[test]
    fn test_no_repeat_speaker_when_alternatives_exist() {
        let chat = round_robin_team(15, 10);
        let replies = vec![0; chat.participants().len()];
        let eligible = chat.eligible_speakers(2, &replies);
        assert!(!eligible.contains(&2));
        assert_eq!(eligible.len(), 3);
    }

    #[test]
    fn test_turn_defaults_when_fields_missing() {
        let turn: ConversationTurn = serde_json::from_str(r#"{"role":"assistant"}"#).unwrap();
        assert_eq!(turn.role, TurnRole::Assistant);
        assert_eq!(turn.content, "");
        assert_eq!(turn.name, "");
    }
}
