// Seams between the simulation core and its collaborators

use crate::core::episode::EpisodeSummary;
use crate::core::simulation::TickReport;

/// Maps a station's fixed-width local observation to a decision vector whose
/// first two entries are read as `(increase, decrease)`.
pub trait Policy: Send {
    fn predict(&self, observation: &[f64]) -> Vec<f64>;
}

impl<F> Policy for F
where
    F: Fn(&[f64]) -> Vec<f64> + Send,
{
    fn predict(&self, observation: &[f64]) -> Vec<f64> {
        self(observation)
    }
}

/// Called once per completed tick.
pub trait TickObserver: Send {
    fn on_tick(&mut self, report: &TickReport<'_>);
}

impl<F> TickObserver for F
where
    F: for<'a, 'b> FnMut(&'a TickReport<'b>) + Send,
{
    fn on_tick(&mut self, report: &TickReport<'_>) {
        self(report)
    }
}

/// Called once per finished episode with its final score.
pub trait EpisodeObserver: Send {
    fn on_episode_finished(&mut self, summary: &EpisodeSummary);
}

impl<F> EpisodeObserver for F
where
    F: FnMut(&EpisodeSummary) + Send,
{
    fn on_episode_finished(&mut self, summary: &EpisodeSummary) {
        self(summary)
    }
}
