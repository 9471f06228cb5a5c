//! Chat references, display labels and entity resolution

use grammers_client::types::peer::Peer;
use grammers_client::Client;
use grammers_tl_types as tl;
use serde::Serialize;

use crate::error::{Error, Result};

/// Offset added to channel ids in the marked dialog id form.
const CHANNEL_MARK: i64 = 1_000_000_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerKind {
    User,
    Group,
    Channel,
}

/// Marked dialog id: users as-is, basic groups negated, channels `-100<id>`.
pub fn marked_id(kind: PeerKind, bare: i64) -> i64 {
    match kind {
        PeerKind::User => bare,
        PeerKind::Group => -bare,
        PeerKind::Channel => -(CHANNEL_MARK + bare),
    }
}

/// Split a marked dialog id into its kind and bare id. Zero is not a valid id.
pub fn unmark_id(marked: i64) -> Option<(PeerKind, i64)> {
    if marked <= -CHANNEL_MARK {
        Some((PeerKind::Channel, -(marked + CHANNEL_MARK)))
    } else if marked < 0 {
        Some((PeerKind::Group, -marked))
    } else if marked > 0 {
        Some((PeerKind::User, marked))
    } else {
        None
    }
}

/// A chat reference as typed on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEntity {
    /// Channel or supergroup by bare ID
    Channel(i64),
    /// Basic group by bare ID
    Chat(i64),
    /// User by ID
    User(i64),
    /// Public username (without @)
    Username(String),
}

impl ChatEntity {
    pub fn username(name: &str) -> Self {
        let name = name.strip_prefix('@').unwrap_or(name);
        ChatEntity::Username(name.to_string())
    }

    /// Parse user input into a reference.
    ///
    /// Accepts `@name`, `name`, `t.me/name` links and marked dialog IDs
    /// (`-100<id>` for channels, `-<id>` for basic groups, positive for users).
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(Error::Usage("--chat must not be empty".to_string()));
        }

        if let Ok(id) = input.parse::<i64>() {
            let (kind, bare) = unmark_id(id)
                .ok_or_else(|| Error::Usage(format!("Invalid chat id '{}'", input)))?;
            return Ok(match kind {
                PeerKind::Channel => ChatEntity::Channel(bare),
                PeerKind::Group => ChatEntity::Chat(bare),
                PeerKind::User => ChatEntity::User(bare),
            });
        }

        let link = input
            .trim_start_matches("https://")
            .trim_start_matches("http://");
        if let Some(path) = link
            .strip_prefix("t.me/")
            .or_else(|| link.strip_prefix("telegram.me/"))
        {
            let name = path.split(['/', '?']).next().unwrap_or_default();
            if name.is_empty() {
                return Err(Error::Usage(format!("Cannot parse chat link '{}'", input)));
            }
            return Ok(ChatEntity::username(name));
        }

        Ok(ChatEntity::username(input))
    }

    /// Marked dialog id of a numeric reference.
    pub fn marked_id(&self) -> Option<i64> {
        match self {
            ChatEntity::Channel(id) => Some(marked_id(PeerKind::Channel, *id)),
            ChatEntity::Chat(id) => Some(marked_id(PeerKind::Group, *id)),
            ChatEntity::User(id) => Some(marked_id(PeerKind::User, *id)),
            ChatEntity::Username(_) => None,
        }
    }

    fn matches(&self, peer: &Peer) -> bool {
        self.marked_id() == Some(peer_marked_id(peer))
    }
}

impl std::fmt::Display for ChatEntity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatEntity::Channel(id) => write!(f, "channel {}", id),
            ChatEntity::Chat(id) => write!(f, "group {}", id),
            ChatEntity::User(id) => write!(f, "user {}", id),
            ChatEntity::Username(name) => write!(f, "@{}", name),
        }
    }
}

/// The naming fields a conversation may carry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChatLabel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
}

impl ChatLabel {
    pub fn new(title: Option<&str>, username: Option<&str>, first_name: Option<&str>) -> Self {
        Self {
            title: title.map(str::to_string),
            username: username.map(str::to_string),
            first_name: first_name.map(str::to_string),
        }
    }

    pub fn titled(title: &str) -> Self {
        Self::new(Some(title), None, None)
    }

    /// First non-empty of title, username, first name.
    pub fn display(&self) -> Option<&str> {
        [&self.title, &self.username, &self.first_name]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .find(|value| !value.is_empty())
    }
}

/// Marked dialog ID of a peer.
///
/// Megagroups are channels on the wire, so they get the channel mark even
/// when listed as groups.
pub fn peer_marked_id(peer: &Peer) -> i64 {
    match peer {
        Peer::User(u) => marked_id(PeerKind::User, u.raw.id()),
        Peer::Channel(c) => marked_id(PeerKind::Channel, c.raw.id),
        Peer::Group(g) => match &g.raw {
            tl::enums::Chat::Empty(c) => marked_id(PeerKind::Group, c.id),
            tl::enums::Chat::Chat(c) => marked_id(PeerKind::Group, c.id),
            tl::enums::Chat::Forbidden(c) => marked_id(PeerKind::Group, c.id),
            tl::enums::Chat::Channel(c) => marked_id(PeerKind::Channel, c.id),
            tl::enums::Chat::ChannelForbidden(c) => marked_id(PeerKind::Channel, c.id),
        },
    }
}

/// Collect the naming fields of a peer.
pub fn peer_label(peer: &Peer) -> ChatLabel {
    match peer {
        Peer::Channel(c) => ChatLabel::new(Some(c.title()), c.username(), None),
        Peer::Group(g) => ChatLabel::new(g.title(), g.username(), None),
        Peer::User(u) => {
            let first_name = match &u.raw {
                tl::enums::User::User(user) => user.first_name.as_deref(),
                tl::enums::User::Empty(_) => None,
            };
            ChatLabel::new(None, u.username(), first_name)
        }
    }
}

/// Resolve a ChatEntity to an actual Peer.
///
/// Usernames go through the resolver; IDs are looked up in the dialog list,
/// so the account must already be a member of the chat.
pub async fn resolve_chat(client: &Client, entity: &ChatEntity) -> Result<Peer> {
    if let ChatEntity::Username(username) = entity {
        return client
            .resolve_username(username)
            .await
            .map_err(|e| Error::TelegramError(e.to_string()))?
            .ok_or_else(|| Error::ChatNotFound(format!("Username @{} not found", username)));
    }

    let mut dialogs = client.iter_dialogs();
    while let Some(dialog) = dialogs
        .next()
        .await
        .map_err(|e| Error::TelegramError(e.to_string()))?
    {
        if entity.matches(&dialog.peer) {
            return Ok(dialog.peer.clone());
        }
    }

    Err(Error::ChatNotFound(format!("{} not found in dialogs", entity)))
}
