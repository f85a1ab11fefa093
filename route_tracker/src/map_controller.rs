use chrono::{DateTime, Utc};
use geo_types::Point;
use route_tracker_lib::{geo_util::MapRegion, LocationFix, SessionSummary, TrackSession, TripStatistics, ViewMode};
use tokio::sync::mpsc;

/// Button presses from the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    ToggleViewMode,
    StartSession,
    StopSession,
}

/// What the map and labels should show after a change.
#[derive(Debug, Clone, PartialEq)]
pub struct PresentationUpdate {
    pub view_mode: ViewMode,
    /// Label values, while a session is active.
    pub statistics: Option<TripStatistics>,
    /// Vertex to append to the polyline of the active session.
    pub path_vertex: Option<Point>,
    /// Region to move the map to, in follow mode.
    pub recenter: Option<MapRegion>,
}

/// Turns tracker fixes and user commands into presentation updates.
pub struct MapController {
    view_mode: ViewMode,
    session: Option<TrackSession>,
    last_fix: Option<LocationFix>,
    region_span_m: f64,
}

impl MapController {
    pub fn new(region_span_m: f64) -> Self {
        Self {
            view_mode: ViewMode::default(),
            session: None,
            last_fix: None,
            region_span_m,
        }
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn session(&self) -> Option<&TrackSession> {
        self.session.as_ref()
    }

    pub fn last_fix(&self) -> Option<LocationFix> {
        self.last_fix
    }

    /// Returns false if a session was already running.
    pub fn start_session(&mut self, now: DateTime<Utc>) -> bool {
        if self.session.is_some() {
            return false;
        }
        tracing::info!("Track session started");
        self.session = Some(TrackSession::new(now));
        true
    }

    pub fn stop_session(&mut self, now: DateTime<Utc>) -> Option<SessionSummary> {
        let summary = self.session.take()?.summary(now);
        tracing::info!("Track session stopped: {}", summary);
        Some(summary)
    }

    /// Cycles the view mode. Returns the region to jump to when following resumes.
    pub fn toggle_view_mode(&mut self) -> Option<MapRegion> {
        let mode = self.view_mode.toggle();
        tracing::info!("Viewing mode is now {:?}", mode);

        if mode.recenters_on_fix() {
            self.last_fix.map(|fix| self.region_around(&fix))
        } else {
            None
        }
    }

    fn region_around(&self, fix: &LocationFix) -> MapRegion {
        MapRegion::centered_on(fix.position, self.region_span_m)
    }

    pub fn on_fix_received(&mut self, fix: LocationFix, now: DateTime<Utc>) -> PresentationUpdate {
        self.last_fix = Some(fix);

        let (statistics, path_vertex) = match self.session.as_mut() {
            Some(session) => {
                let update = session.on_fix_received(fix, now);
                (Some(update.statistics), Some(update.new_vertex))
            }
            None => (None, None),
        };

        PresentationUpdate {
            view_mode: self.view_mode,
            statistics,
            path_vertex,
            recenter: self.view_mode.recenters_on_fix().then(|| self.region_around(&fix)),
        }
    }

    /// Applies a command. Toggling back to follow mode produces an update
    /// carrying the region to re-center on.
    pub fn handle_command(&mut self, command: ControlCommand, now: DateTime<Utc>) -> Option<PresentationUpdate> {
        match command {
            ControlCommand::ToggleViewMode => {
                let recenter = self.toggle_view_mode();
                Some(PresentationUpdate {
                    view_mode: self.view_mode,
                    statistics: self.session.as_ref().and_then(|session| session.statistics(now)),
                    path_vertex: None,
                    recenter,
                })
            }
            ControlCommand::StartSession => {
                self.start_session(now);
                None
            }
            ControlCommand::StopSession => {
                self.stop_session(now);
                None
            }
        }
    }

    /// Runs until the fix stream closes or nobody listens for updates.
    /// Returns the summary of a session that was still active.
    pub async fn run(
        mut self,
        mut fixes: mpsc::UnboundedReceiver<LocationFix>,
        mut commands: mpsc::Receiver<ControlCommand>,
        updates: mpsc::Sender<PresentationUpdate>,
    ) -> Option<SessionSummary> {
        let mut commands_open = true;

        loop {
            let update = tokio::select! {
                fix = fixes.recv() => match fix {
                    Some(fix) => Some(self.on_fix_received(fix, Utc::now())),
                    None => break,
                },
                command = commands.recv(), if commands_open => match command {
                    Some(command) => self.handle_command(command, Utc::now()),
                    None => {
                        commands_open = false;
                        None
                    }
                },
            };

            if let Some(update) = update {
                if updates.send(update).await.is_err() {
                    tracing::debug!("Presentation layer went away");
                    break;
                }
            }
        }

        self.stop_session(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use super::*;

    fn start() -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH
    }

    fn fix(lat: f64, lon: f64) -> LocationFix {
        LocationFix::from_lat_lon(lat, lon, 1.25, start())
    }

    #[test]
    fn follow_mode_recenters_on_every_fix() {
        let mut controller = MapController::new(1000.);

        let update = controller.on_fix_received(fix(55., 12.), start());

        let region = update.recenter.unwrap();
        assert_eq!(region.center, Point::new(12., 55.));
        assert_eq!(update.view_mode, ViewMode::FollowUser);
    }

    #[test]
    fn free_mode_leaves_the_map_alone() {
        let mut controller = MapController::new(1000.);
        assert_eq!(controller.toggle_view_mode(), None);

        let update = controller.on_fix_received(fix(55., 12.), start());
        assert_eq!(update.recenter, None);
        assert_eq!(update.view_mode, ViewMode::Free);
    }

    #[test]
    fn returning_to_follow_recenters_on_last_fix() {
        let mut controller = MapController::new(500.);
        controller.toggle_view_mode();
        controller.on_fix_received(fix(10., 20.), start());

        let region = controller.toggle_view_mode().unwrap();
        assert_eq!(region, MapRegion::centered_on(Point::new(20., 10.), 500.));
        assert_eq!(controller.view_mode(), ViewMode::FollowUser);
    }

    #[test]
    fn statistics_only_while_session_is_active() {
        let mut controller = MapController::new(1000.);
        let update = controller.on_fix_received(fix(0., 0.), start());
        assert!(update.statistics.is_none());
        assert!(update.path_vertex.is_none());

        assert!(controller.start_session(start()));
        assert!(!controller.start_session(start()));
        controller.on_fix_received(fix(0., 0.), start());
        let update = controller.on_fix_received(fix(0., 0.001), start() + TimeDelta::seconds(3));

        let statistics = update.statistics.unwrap();
        assert_eq!(statistics.distance_label(), "111m");
        assert_eq!(statistics.time_label(), "3s");
        assert_eq!(statistics.speed_label(), "1.25");
        assert_eq!(update.path_vertex, Some(Point::new(0.001, 0.)));
        assert_eq!(controller.session().unwrap().path().0.len(), 2);

        let summary = controller.stop_session(start() + TimeDelta::seconds(4)).unwrap();
        assert_eq!(summary.fix_count, 2);
        assert!(controller.session().is_none());
        assert!(controller.stop_session(start()).is_none());
    }

    #[test]
    fn toggle_command_reports_mode_change() {
        let mut controller = MapController::new(1000.);
        controller.on_fix_received(fix(1., 1.), start());

        let update = controller.handle_command(ControlCommand::ToggleViewMode, start()).unwrap();
        assert_eq!(update.view_mode, ViewMode::Free);
        assert!(update.recenter.is_none());

        let update = controller.handle_command(ControlCommand::ToggleViewMode, start()).unwrap();
        assert_eq!(update.view_mode, ViewMode::FollowUser);
        assert!(update.recenter.is_some());

        assert!(controller.handle_command(ControlCommand::StartSession, start()).is_none());
        assert!(controller.session().is_some());
        assert!(controller.handle_command(ControlCommand::StopSession, start()).is_none());
        assert!(controller.session().is_none());
    }

    #[tokio::test]
    async fn run_forwards_updates_and_returns_summary() {
        let (fix_tx, fix_rx) = mpsc::unbounded_channel();
        let (command_tx, command_rx) = mpsc::channel(4);
        let (update_tx, mut update_rx) = mpsc::channel(16);

        let mut controller = MapController::new(1000.);
        controller.start_session(Utc::now());
        let handle = tokio::spawn(controller.run(fix_rx, command_rx, update_tx));

        fix_tx.send(fix(0., 0.)).unwrap();
        fix_tx.send(fix(0., 0.001)).unwrap();
        fix_tx.send(fix(0., 0.002)).unwrap();
        drop(command_tx);
        drop(fix_tx);

        let summary = handle.await.unwrap().unwrap();
        assert_eq!(summary.fix_count, 3);
        assert!((summary.traveled_distance_m - 222.39).abs() < 0.02);

        let mut received = 0;
        while let Some(update) = update_rx.recv().await {
            assert!(update.recenter.is_some());
            received += 1;
        }
        assert_eq!(received, 3);
    }

    #[tokio::test]
    async fn backlog_of_fixes_is_fully_accumulated() {
        let (fix_tx, fix_rx) = mpsc::unbounded_channel();
        let (_command_tx, command_rx) = mpsc::channel(1);
        let (update_tx, mut update_rx) = mpsc::channel::<PresentationUpdate>(1);

        let count = 3_000;
        for i in 0..count {
            fix_tx.send(fix(0., i as f64 * 0.001)).unwrap();
        }
        drop(fix_tx);

        let presenter = tokio::spawn(async move {
            let mut vertices = 0;
            while let Some(update) = update_rx.recv().await {
                if update.path_vertex.is_some() {
                    vertices += 1;
                }
            }
            vertices
        });

        let mut controller = MapController::new(1000.);
        controller.start_session(start());
        let summary = controller.run(fix_rx, command_rx, update_tx).await.unwrap();

        assert_eq!(summary.fix_count, count);
        let expected = (count - 1) as f64 * 111.195;
        assert!((summary.traveled_distance_m - expected).abs() < 1., "got {}", summary.traveled_distance_m);
        assert_eq!(presenter.await.unwrap(), count);
    }
}
