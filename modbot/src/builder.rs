use crate::model::id::{ChannelId, MessageId};
use crate::util::color::Color;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// [`CreateMessage`] is used to construct a new message or to replace
/// the contents of an existing one.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateMessage {
    pub content: Option<String>,
    pub reference_message: Option<(ChannelId, MessageId)>,
    pub embed: Option<CreateEmbed>,
}

impl CreateMessage {
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        let mut builder = Self::default();
        f(&mut builder);
        builder
    }

    /// Creates a message reporting an error to the user.
    pub fn error<T>(text: T) -> Self
    where
        T: AsRef<str>,
    {
        Self::from(format!("❗ {}", text.as_ref()))
    }

    /// Creates a message warning the user.
    pub fn warn<T>(text: T) -> Self
    where
        T: AsRef<str>,
    {
        Self::from(format!("⚠ {}", text.as_ref()))
    }

    /// Set the content of the message.
    pub fn content<T>(&mut self, content: T) -> &mut Self
    where
        T: ToString,
    {
        self.content = Some(content.to_string());
        self
    }

    pub fn reference_message(&mut self, channel_id: ChannelId, message_id: MessageId) -> &mut Self {
        self.reference_message = Some((channel_id, message_id));
        self
    }

    pub fn embed<F>(&mut self, f: F) -> &mut Self
    where
        F: FnOnce(&mut CreateEmbed),
    {
        self.embed = Some(CreateEmbed::new(f));
        self
    }

    /// Returns `true` if neither content nor an embed is set.
    pub fn is_empty(&self) -> bool {
        self.content.as_deref().map_or(true, str::is_empty) && self.embed.is_none()
    }
}

impl<T> From<T> for CreateMessage
where
    T: AsRef<str>,
{
    fn from(t: T) -> Self {
        let mut builder = Self::default();
        builder.content(t.as_ref());
        builder
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateEmbed {
    pub author: Option<EmbedAuthor>,
    pub color: Option<Color>,
    pub description: Option<String>,
    pub fields: Vec<EmbedField>,
    pub footer: Option<String>,
    pub thumbnail: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub title: Option<String>,
}

impl CreateEmbed {
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        let mut builder = Self::default();
        f(&mut builder);
        builder
    }

    pub fn author<T, U>(&mut self, name: T, icon_url: Option<U>) -> &mut Self
    where
        T: ToString,
        U: ToString,
    {
        self.author = Some(EmbedAuthor {
            name: name.to_string(),
            icon_url: icon_url.map(|url| url.to_string()),
        });
        self
    }

    pub fn description<T>(&mut self, description: T) -> &mut Self
    where
        T: ToString,
    {
        self.description = Some(description.to_string());
        self
    }

    pub fn field<T, U>(&mut self, name: T, value: U, inline: bool) -> &mut Self
    where
        T: ToString,
        U: ToString,
    {
        self.fields.push(EmbedField {
            name: name.to_string(),
            value: value.to_string(),
            inline,
        });
        self
    }

    pub fn footer<T>(&mut self, text: T) -> &mut Self
    where
        T: ToString,
    {
        self.footer = Some(text.to_string());
        self
    }

    pub fn thumbnail<T>(&mut self, url: T) -> &mut Self
    where
        T: ToString,
    {
        self.thumbnail = Some(url.to_string());
        self
    }

    pub fn timestamp(&mut self, timestamp: DateTime<Utc>) -> &mut Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn title<T>(&mut self, title: T) -> &mut Self
    where
        T: ToString,
    {
        self.title = Some(title.to_string());
        self
    }

    pub fn color<T>(&mut self, color: T) -> &mut Self
    where
        T: Into<Color>,
    {
        self.color = Some(color.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedAuthor {
    pub name: String,
    pub icon_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[cfg(test)]
mod tests {
    use super::CreateMessage;

    #[test]
    fn test_create_message() {
        let msg = CreateMessage::error("Something broke");
        assert_eq!(msg.content.as_deref(), Some("❗ Something broke"));

        let msg = CreateMessage::new(|m| {
            m.embed(|e| {
                e.title("Title").field("a", 1, true);
            });
        });
        assert!(!msg.is_empty());
        assert!(msg.content.is_none());
        assert_eq!(msg.embed.unwrap().fields.len(), 1);

        assert!(CreateMessage::from("").is_empty());
    }
}
