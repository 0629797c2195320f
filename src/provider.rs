use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use tracing::warn;

use crate::league::{AppConfig, League};
use crate::league_fetch::fetch_league_document;
use crate::state::{Delta, ProviderCommand};
use crate::tables::LeagueView;
use crate::win_prob::OutcomeEstimator;

/// Serves load commands one at a time on a background thread. The thread
/// exits once the command sender is dropped.
pub fn spawn_provider(config: AppConfig, tx: Sender<Delta>, cmd_rx: Receiver<ProviderCommand>) {
    thread::spawn(move || {
        let estimator = OutcomeEstimator::new(config.tiers.clone());
        for msg in &config.warnings {
            let _ = tx.send(Delta::Log(msg.clone()));
        }

        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                ProviderCommand::Load { league } => {
                    let _ = tx.send(Delta::LoadStarted(league));
                    let _ = tx.send(load_league(&config, &estimator, league));
                }
            }
        }
    });
}

/// One complete load: fetch, parse, derive. Either a full view or a failure.
pub fn load_league(config: &AppConfig, estimator: &OutcomeEstimator, league: League) -> Delta {
    let cfg = config.league(league);
    match fetch_league_document(&cfg.source) {
        Ok(doc) => Delta::SetLeagueView {
            league,
            view: Box::new(LeagueView::build(&doc, &cfg, estimator, config.source_order)),
        },
        Err(err) => {
            warn!(league = league.slug(), %err, "league load failed");
            Delta::LoadFailed {
                league,
                reason: err.to_string(),
            }
        }
    }
}
