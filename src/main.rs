use std::sync::Arc;

use anyhow::Result;

use dataweb::config::Config;
use dataweb::logging::log_startup;
use dataweb::poll::{DetailScreen, HttpTransport, PollController, PollRunner};
use dataweb::view::HtmlFile;

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env().with_instrument_arg(std::env::args().nth(1));
    let catalog = Arc::new(cfg.load_catalog()?);
    let transport = HttpTransport::new(cfg.base_url(), cfg.request_timeout())?;

    log_startup("dataweb", &cfg.instrument, &cfg.base_url(), cfg.poll_ms, cfg.timeout_ms);

    let view = HtmlFile::new(&cfg.output_path, cfg.refresh_secs());
    let screen = DetailScreen::new(catalog, cfg.instrument.clone(), cfg.render_options(), view);
    let runner = PollRunner::new(
        PollController::new(cfg.instrument.clone(), cfg.stale_policy),
        Arc::new(transport),
        screen,
        cfg.poll_interval(),
        cfg.request_timeout(),
    );
    runner.run(cfg.max_ticks).await?;
    Ok(())
}
