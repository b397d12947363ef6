//! Response segmentation.
//!
//! Turns the group-chat transcript into the three display buckets. Persona
//! replies are parsed by their tagged blocks first; when no tag is present
//! anywhere the transcript is split positionally on blank lines.

use crate::groupchat::{ConversationTurn, TurnRole};
use serde::{Deserialize, Serialize};

const SEPARATOR: &str = "\n\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    Assessment,
    Action,
    Followup,
}

impl Bucket {
    pub const ALL: [Bucket; 3] = [Bucket::Assessment, Bucket::Action, Bucket::Followup];

    pub fn tag(&self) -> &'static str {
        match self {
            Bucket::Assessment => "assessment",
            Bucket::Action => "action_plan",
            Bucket::Followup => "followup",
        }
    }
}

/// The three display buckets. Missing sections are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionOutput {
    pub assessment: String,
    pub action: String,
    pub followup: String,
}

impl SessionOutput {
    fn slot_mut(&mut self, bucket: Bucket) -> &mut String {
        match bucket {
            Bucket::Assessment => &mut self.assessment,
            Bucket::Action => &mut self.action,
            Bucket::Followup => &mut self.followup,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentStrategy {
    Labeled,
    Positional,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segmented {
    pub sections: SessionOutput,
    /// Text that could not be placed in any bucket.
    pub unparsed: Vec<String>,
    pub strategy: SegmentStrategy,
}

/// Concatenate the text of assistant-tagged turns with a blank-line separator.
pub fn assistant_transcript(turns: &[ConversationTurn]) -> String {
    turns
        .iter()
        .filter(|t| t.role == TurnRole::Assistant)
        .map(|t| t.content.as_str())
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

fn split_positional(transcript: &str) -> (SessionOutput, Vec<String>) {
    let mut fragments = transcript.split(SEPARATOR).map(str::to_string);
    let output = SessionOutput {
        assessment: fragments.next().unwrap_or_default(),
        action: fragments.next().unwrap_or_default(),
        followup: fragments.next().unwrap_or_default(),
    };
    (output, fragments.collect())
}

/// Positional split: fragment 0, 1, 2 fill the buckets; anything past index 2 is dropped.
pub fn segment_by_position(turns: &[ConversationTurn]) -> SessionOutput {
    split_positional(&assistant_transcript(turns)).0
}

/// Parse `<tag>...</tag>` blocks out of assistant turns.
///
/// Returns `None` when no turn carries any recognised opening tag.
pub fn segment_by_label(turns: &[ConversationTurn]) -> Option<Segmented> {
    let mut sections = SessionOutput::default();
    let mut unparsed = Vec::new();
    let mut found_any = false;

    for turn in turns.iter().filter(|t| t.role == TurnRole::Assistant) {
        let mut rest = turn.content.as_str();

        while let Some((start, bucket)) = find_open_tag(rest) {
            found_any = true;
            push_unparsed(&mut unparsed, &rest[..start]);

            let open_len = bucket.tag().len() + 2;
            let body_start = start + open_len;
            let close = format!("</{}>", bucket.tag());
            let (body, next) = match find_ascii_ci(&rest[body_start..], &close) {
                Some(end) => (
                    &rest[body_start..body_start + end],
                    body_start + end + close.len(),
                ),
                // Unclosed block runs to the end of the turn.
                None => (&rest[body_start..], rest.len()),
            };

            let body = body.trim();
            if !body.is_empty() {
                let slot = sections.slot_mut(bucket);
                if !slot.is_empty() {
                    slot.push_str(SEPARATOR);
                }
                slot.push_str(body);
            }
            rest = &rest[next..];
        }

        push_unparsed(&mut unparsed, rest);
    }

    found_any.then_some(Segmented {
        sections,
        unparsed,
        strategy: SegmentStrategy::Labeled,
    })
}

/// Label-based parse with positional fallback; positional overflow is kept as unparsed.
pub fn segment(turns: &[ConversationTurn]) -> Segmented {
    segment_by_label(turns).unwrap_or_else(|| {
        let (sections, unparsed) = split_positional(&assistant_transcript(turns));
        Segmented {
            sections,
            unparsed,
            strategy: SegmentStrategy::Positional,
        }
    })
}

fn push_unparsed(unparsed: &mut Vec<String>, text: &str) {
    let text = text.trim();
    if !text.is_empty() {
        unparsed.push(text.to_string());
    }
}

/// Earliest opening tag of any bucket.
fn find_open_tag(text: &str) -> Option<(usize, Bucket)> {
    Bucket::ALL
        .iter()
        .filter_map(|b| find_ascii_ci(text, &format!("<{}>", b.tag())).map(|pos| (pos, *b)))
        .min_by_key(|(pos, _)| *pos)
}

// ASCII lowercasing keeps byte offsets aligned with the original string.
fn find_ascii_ci(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .to_ascii_lowercase()
        .find(&needle.to_ascii_lowercase())
}
