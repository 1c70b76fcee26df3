//! Long-poll runner: connects as the bot and logs every incoming update.

use std::sync::Arc;
use std::time::Duration;

use maxbot_core::{api::UpdatePoll, config::Config, MaxClient};
use maxbot_reqwest::ReqwestTransport;

#[tokio::main]
async fn main() -> Result<(), maxbot_core::Error> {
    maxbot_core::logging::init("maxbot")?;

    let cfg = Config::load()?;
    let transport = Arc::new(ReqwestTransport::new()?);
    let client = MaxClient::new(cfg.access_token.clone(), transport)
        .with_base_url(cfg.base_url.clone())
        .with_timeout(Some(cfg.request_timeout));

    let me = client.get_me().await?;
    let bot_name = me
        .get("name")
        .and_then(|v| v.as_str())
        .unwrap_or("<unnamed>")
        .to_string();
    tracing::info!(bot = %bot_name, "connected");

    let mut marker: Option<i64> = None;
    loop {
        let poll = UpdatePoll {
            limit: cfg.poll_limit,
            timeout_secs: cfg.poll_timeout_secs,
            marker,
            types: cfg.poll_types.clone(),
        };

        match client.get_updates(poll).await {
            Ok(page) => {
                for update in &page.items {
                    tracing::info!(
                        update_type = %update.update_type,
                        timestamp = update.timestamp,
                        "update"
                    );
                }
                // Echo the marker back; keep the old one if none was issued.
                if page.marker.is_some() {
                    marker = page.marker;
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "poll failed, backing off");
                tokio::time::sleep(Duration::from_secs(3)).await;
            }
        }
    }
}
