// =============================================================================
// Notifications
// =============================================================================
//
// Turns a Signal into a Discord embed and delivers it over a webhook.

pub mod discord;
pub mod message;

pub use discord::DiscordNotifier;
