use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::PreviewSettings;

use super::manager::PreviewManager;
use super::sink::RodioOutput;
use super::types::{ClipSource, LinkOpener, LoadJob, Notifier, PreviewCmd, PreviewHandle, TrackLookup};

/// How often the live handle is checked for its end or an output fault.
pub(super) const POLL_INTERVAL: Duration = Duration::from_millis(200);

pub(super) fn spawn_preview_thread<C, X, N>(
    client: C,
    opener: X,
    notifier: N,
    rx: Receiver<PreviewCmd>,
    tx: Sender<PreviewCmd>,
    info: PreviewHandle,
    settings: PreviewSettings,
) -> JoinHandle<()>
where
    C: TrackLookup + ClipSource + Clone + Send + 'static,
    X: LinkOpener + Send + 'static,
    N: Notifier + Send + 'static,
{
    thread::spawn(move || {
        // The rodio stream must be created on the thread that owns it.
        let output = RodioOutput::new(settings.volume);
        let mut manager = PreviewManager::new(
            Box::new(output),
            Box::new(client.clone()),
            Box::new(opener),
            Box::new(notifier),
            info,
        )
        .with_external_fallback(settings.open_external_fallback);

        drive(&mut manager, &rx, |job| spawn_load(job, client.clone(), tx.clone()));
    })
}

/// Feed commands from `rx` to `manager` until `Quit` or disconnect.
///
/// `manager.poll()` runs once per `POLL_INTERVAL` however busy the channel
/// is. Load jobs are handed to `on_job`.
pub(super) fn drive<F>(manager: &mut PreviewManager, rx: &Receiver<PreviewCmd>, mut on_job: F)
where
    F: FnMut(LoadJob),
{
    let mut last_poll = Instant::now();
    loop {
        match rx.recv_timeout(POLL_INTERVAL.saturating_sub(last_poll.elapsed())) {
            Ok(PreviewCmd::Request(track)) => {
                if let Some(job) = manager.request_playback(&track) {
                    on_job(job);
                }
                debug!("preview state now {:?}", manager.state());
            }
            Ok(PreviewCmd::Stop) => manager.stop_playback(),
            Ok(PreviewCmd::Loaded { ticket, result }) => manager.load_finished(ticket, result),
            Ok(PreviewCmd::Quit) => {
                manager.shutdown();
                return;
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => return,
        }

        if last_poll.elapsed() >= POLL_INTERVAL {
            manager.poll();
            last_poll = Instant::now();
        }
    }
}

/// Download a clip off the preview thread and post the result back.
fn spawn_load<C>(job: LoadJob, client: C, tx: Sender<PreviewCmd>)
where
    C: ClipSource + Send + 'static,
{
    thread::spawn(move || {
        let result = client.fetch_clip(&job.url);
        if tx
            .send(PreviewCmd::Loaded {
                ticket: job.ticket,
                result,
            })
            .is_err()
        {
            debug!("preview thread gone; dropping clip for {}", job.track_id);
        }
    });
}
