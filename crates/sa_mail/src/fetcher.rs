use sa_core::{Config, Error, Result};
use tracing::{error, info, warn};

use crate::mime::extract_html_part;

const IMAP_PORT: u16 = 993;
const ALERT_SENDER: &str = "scholaralerts-noreply@google.com";

/// Fetches unread Scholar alert emails over IMAP.
///
/// Each successfully extracted message is flagged `\Seen`; the session is
/// logged out on every path, including errors.
pub struct MailFetcher {
    server: String,
    username: String,
    password: String,
    folder: String,
}

impl MailFetcher {
    pub fn new(config: &Config) -> Self {
        Self {
            server: config.email_server.clone(),
            username: config.email_username.clone(),
            password: config.email_password.clone(),
            folder: config.email_folder.clone(),
        }
    }

    /// Fetch the HTML bodies of unread alert emails.
    ///
    /// The IMAP protocol crate is blocking, so the whole exchange runs on the
    /// blocking thread pool.
    pub async fn fetch_unread(&self) -> Result<Vec<String>> {
        let server = self.server.clone();
        let username = self.username.clone();
        let password = self.password.clone();
        let folder = self.folder.clone();

        tokio::task::spawn_blocking(move || {
            fetch_unread_blocking(&server, &username, &password, &folder)
        })
        .await
        .map_err(|e| Error::Mail(format!("Mail fetch task failed: {}", e)))?
    }
}

fn fetch_unread_blocking(
    server: &str,
    username: &str,
    password: &str,
    folder: &str,
) -> Result<Vec<String>> {
    let tls = native_tls::TlsConnector::builder()
        .build()
        .map_err(|e| Error::Mail(format!("TLS setup failed: {}", e)))?;

    let client = imap::connect((server, IMAP_PORT), server, &tls)
        .map_err(|e| Error::Mail(format!("Could not connect to {}: {}", server, e)))?;

    let mut session = client
        .login(username, password)
        .map_err(|(e, _)| Error::Mail(format!("IMAP login failed: {}", e)))?;

    let result = fetch_from_session(&mut session, folder);

    if let Err(e) = session.logout() {
        warn!("IMAP logout failed: {}", e);
    }

    result
}

fn fetch_from_session<T: std::io::Read + std::io::Write>(
    session: &mut imap::Session<T>,
    folder: &str,
) -> Result<Vec<String>> {
    session
        .select(folder)
        .map_err(|e| Error::Mail(format!("Could not select folder {}: {}", folder, e)))?;

    let query = format!("UNSEEN FROM \"{}\"", ALERT_SENDER);
    let ids = match session.search(&query) {
        Ok(ids) => ids,
        Err(e) => {
            error!("Could not search mailbox: {}", e);
            return Ok(Vec::new());
        }
    };

    let mut ids: Vec<u32> = ids.into_iter().collect();
    ids.sort_unstable();

    let mut html_bodies = Vec::new();
    for id in ids {
        let messages = match session.fetch(id.to_string(), "RFC822") {
            Ok(messages) => messages,
            Err(e) => {
                warn!("Failed to fetch message {}: {}", id, e);
                continue;
            }
        };

        let Some(raw) = messages.iter().next().and_then(|m| m.body()) else {
            warn!("Message {} had no body", id);
            continue;
        };

        match extract_html_part(raw) {
            Some(html) => {
                html_bodies.push(html);
                if let Err(e) = session.store(id.to_string(), "+FLAGS (\\Seen)") {
                    warn!("Could not mark message {} as read: {}", id, e);
                }
            }
            None => warn!("No HTML part found in message {}", id),
        }
    }

    info!("Fetched {} unread alert emails", html_bodies.len());
    Ok(html_bodies)
}
