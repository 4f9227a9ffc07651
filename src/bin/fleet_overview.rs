use std::sync::Arc;

use anyhow::Result;

use dataweb::config::Config;
use dataweb::logging::log_startup;
use dataweb::poll::{FleetScreen, HttpTransport, PollController, PollRunner};
use dataweb::view::HtmlFile;

/// Query value the service answers with every instrument's summary.
const ALL_INSTRUMENTS: &str = "all";

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();
    let transport = HttpTransport::new(cfg.base_url(), cfg.request_timeout())?;

    log_startup("fleet_overview", ALL_INSTRUMENTS, &cfg.base_url(), cfg.poll_ms, cfg.timeout_ms);

    let view = HtmlFile::new(&cfg.overview_output_path, cfg.refresh_secs());
    let runner = PollRunner::new(
        PollController::new(ALL_INSTRUMENTS, cfg.stale_policy),
        Arc::new(transport),
        FleetScreen::new(cfg.fleet_layout(), view),
        cfg.poll_interval(),
        cfg.request_timeout(),
    );
    runner.run(cfg.max_ticks).await?;
    Ok(())
}
