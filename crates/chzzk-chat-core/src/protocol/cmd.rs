//! Command codes carried in the envelope `cmd` field.

/// Known command codes. Anything else maps to `Unknown` and is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cmd {
    /// Liveness ping, sent by either side.
    Ping,
    /// Reply to a server ping.
    Pong,
    /// Client setup (first frame after dial).
    Setup,
    /// Client login, echoing the server-assigned `sid`.
    Login,
    /// Server notice carrying the `sid` to log in with.
    LoginRequired,
    /// Chat event batch.
    Chat,
    /// Donation event batch.
    Donation,
    Unknown(i64),
}

impl Cmd {
    pub const PING: i64 = 0;
    pub const PONG: i64 = 10000;
    pub const SETUP: i64 = 100;
    pub const LOGIN: i64 = 5101;
    pub const LOGIN_REQUIRED: i64 = 10100;
    pub const CHAT: i64 = 93101;
    pub const DONATION: i64 = 93102;

    pub fn from_code(code: i64) -> Self {
        match code {
            Self::PING => Cmd::Ping,
            Self::PONG => Cmd::Pong,
            Self::SETUP => Cmd::Setup,
            Self::LOGIN => Cmd::Login,
            Self::LOGIN_REQUIRED => Cmd::LoginRequired,
            Self::CHAT => Cmd::Chat,
            Self::DONATION => Cmd::Donation,
            other => Cmd::Unknown(other),
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Cmd::Ping => Self::PING,
            Cmd::Pong => Self::PONG,
            Cmd::Setup => Self::SETUP,
            Cmd::Login => Self::LOGIN,
            Cmd::LoginRequired => Self::LOGIN_REQUIRED,
            Cmd::Chat => Self::CHAT,
            Cmd::Donation => Self::DONATION,
            Cmd::Unknown(c) => c,
        }
    }

    /// Short label for logs and metrics.
    pub fn label(self) -> &'static str {
        match self {
            Cmd::Ping => "ping",
            Cmd::Pong => "pong",
            Cmd::Setup => "setup",
            Cmd::Login => "login",
            Cmd::LoginRequired => "login_required",
            Cmd::Chat => "chat",
            Cmd::Donation => "donation",
            Cmd::Unknown(_) => "unknown",
        }
    }
}
