//! Result formatter: turns one ticket into preview/detail card text.

use crate::extension::protocol::{
    Attachment, Card, PreviewAttachment, HERO_CARD_CONTENT_TYPE, THUMBNAIL_CARD_CONTENT_TYPE,
};
use crate::{format_timestamp, TicketRecord, STATUS_OPEN};

/// Titles longer than this many characters are cut in preview text.
pub const PREVIEW_TITLE_CHARS: usize = 10;

const TITLE_PREFIX: &str = "Request: ";
const ELLIPSIS: &str = "...";
const SEGMENT_DELIMITER: &str = " | ";

/// Text pair rendered for one ticket; `title` is shared by both cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardPair {
    pub preview_text: String,
    pub detail_text: String,
    pub title: String,
}

impl CardPair {
    pub fn into_attachment(self) -> Attachment {
        Attachment {
            content_type: HERO_CARD_CONTENT_TYPE.to_string(),
            content: Card {
                title: self.title.clone(),
                text: self.detail_text,
            },
            preview: PreviewAttachment {
                content_type: THUMBNAIL_CARD_CONTENT_TYPE.to_string(),
                content: Card {
                    title: self.title,
                    text: self.preview_text,
                },
            },
        }
    }
}

/// `"Open"` for status 0, `"Closed"` for every other code.
pub fn status_label(status: i32) -> &'static str {
    if status == STATUS_OPEN { "Open" } else { "Closed" }
}

/// Render a ticket as `Request: <title> | <status> | <date>`.
///
/// The title segment is skipped when the ticket has no title; the status
/// segment always carries its leading delimiter. In preview mode a title
/// longer than [`PREVIEW_TITLE_CHARS`] is cut to that many characters plus `...`.
pub fn format_card(record: &TicketRecord, is_preview: bool) -> String {
    let mut text = String::new();

    if let Some(title) = record.title.as_deref() {
        text.push_str(TITLE_PREFIX);
        if is_preview && title.chars().count() > PREVIEW_TITLE_CHARS {
            text.extend(title.chars().take(PREVIEW_TITLE_CHARS));
            text.push_str(ELLIPSIS);
        } else {
            text.push_str(title);
        }
    }

    text.push_str(SEGMENT_DELIMITER);
    text.push_str(status_label(record.status));

    if let Some(created) = record.date_created.as_ref() {
        text.push_str(SEGMENT_DELIMITER);
        text.push_str(&format_timestamp(created));
    }

    text
}

pub fn card_pair(record: &TicketRecord) -> CardPair {
    CardPair {
        preview_text: format_card(record, true),
        detail_text: format_card(record, false),
        title: record.assigned_to_name.clone(),
    }
}
