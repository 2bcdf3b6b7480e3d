//! Event loop tying the map widget, the device position and the ratings API together.
//!
//! A session runs as a tokio task and is driven through a [`MapSessionHandle`]. Pan and zoom
//! events are debounced; filter changes and explicit locate requests act immediately. Every
//! search runs as its own task and reports back to the loop, which decides whether the result
//! is still wanted before replacing the markers.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::api::EstablishmentSource;
use crate::config::Config;
use crate::error::{ConfigError, FetchError, GeolocationError, SessionError};
use crate::establishment::Establishment;
use crate::geo::{GeoPoint, MapSize, MapViewport};
use crate::geolocation::{locate_with_timeout, GeolocationOptions, Geolocator};
use crate::layer::MapSurface;
use crate::marker::MarkerRenderer;
use crate::query::{EstablishmentQuery, QueryBuilder, QueryPlan};
use crate::view::{FetchKey, ViewState};

/// Why the device position was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LocateReason {
    Startup,
    UserRequest,
}

enum SessionCommand {
    ViewChanged(MapViewport),
    SetTopRatedOnly(bool),
    Locate,
    Located {
        reason: LocateReason,
        result: Result<GeoPoint, GeolocationError>,
    },
    FetchCompleted {
        seq: u64,
        result: Result<Vec<Establishment>, FetchError>,
    },
    Stop,
}

/// Builder of a [`MapSession`].
pub struct MapSessionBuilder {
    source: Arc<dyn EstablishmentSource>,
    surface: Arc<dyn MapSurface>,
    geolocator: Option<Arc<dyn Geolocator>>,
    config: Config,
    size: MapSize,
    only_top_rated: bool,
}

impl MapSessionBuilder {
    /// Uses the given device position provider. Without one, the session behaves like a device
    /// that has no geolocation support.
    pub fn with_geolocator(mut self, geolocator: Arc<dyn Geolocator>) -> Self {
        self.geolocator = Some(geolocator);
        self
    }

    /// Replaces the default config.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Sets the initial size of the map widget.
    pub fn with_size(mut self, size: MapSize) -> Self {
        self.size = size;
        self
    }

    /// Sets the initial state of the "only top rated" filter.
    pub fn with_only_top_rated(mut self, only_top_rated: bool) -> Self {
        self.only_top_rated = only_top_rated;
        self
    }

    /// Starts the session on the current tokio runtime.
    ///
    /// The map is centered on the fallback location, then the device position is requested.
    /// Fails without starting anything if the config does not pass [`Config::validate`].
    pub fn spawn(self) -> Result<MapSessionHandle, ConfigError> {
        self.config.validate()?;

        let (sender, receiver) = mpsc::unbounded_channel();

        let viewport = MapViewport::new(
            self.config.fallback_location,
            self.config.initial_zoom,
            self.size,
        );

        let session = MapSession {
            query_builder: QueryBuilder::new(self.config.limits, self.config.api.page_size),
            renderer: MarkerRenderer::from_config(&self.config),
            geolocation_options: GeolocationOptions::from_config(&self.config),
            source: self.source,
            surface: self.surface,
            geolocator: self.geolocator,
            sender: sender.clone(),
            view: ViewState::new(viewport, self.only_top_rated),
            last_key: None,
            issued_seq: 0,
            cleared_at_seq: 0,
            debounce_deadline: None,
            config: self.config,
        };

        let task = tokio::spawn(session.run(receiver));

        Ok(MapSessionHandle {
            sender,
            task: Some(task),
        })
    }
}

/// State of a running session. Owned by the session task.
pub struct MapSession {
    query_builder: QueryBuilder,
    renderer: MarkerRenderer,
    geolocation_options: GeolocationOptions,
    source: Arc<dyn EstablishmentSource>,
    surface: Arc<dyn MapSurface>,
    geolocator: Option<Arc<dyn Geolocator>>,
    sender: mpsc::UnboundedSender<SessionCommand>,
    view: ViewState,
    last_key: Option<FetchKey>,
    issued_seq: u64,
    cleared_at_seq: u64,
    debounce_deadline: Option<Instant>,
    config: Config,
}

impl MapSession {
    /// Creates a builder of a session loading establishments from `source` and showing them on
    /// `surface`.
    pub fn builder(
        source: Arc<dyn EstablishmentSource>,
        surface: Arc<dyn MapSurface>,
    ) -> MapSessionBuilder {
        MapSessionBuilder {
            source,
            surface,
            geolocator: None,
            config: Config::default(),
            size: MapSize::default(),
            only_top_rated: false,
        }
    }

    async fn run(mut self, mut receiver: mpsc::UnboundedReceiver<SessionCommand>) {
        log::info!("Map session started");
        self.start();

        loop {
            let deadline = self.debounce_deadline;
            tokio::select! {
                command = receiver.recv() => {
                    match command {
                        Some(SessionCommand::Stop) | None => break,
                        Some(command) => self.handle(command),
                    }
                }
                _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.debounce_deadline = None;
                    self.refresh();
                }
            }
        }

        log::info!("Map session stopped");
    }

    fn start(&mut self) {
        self.surface
            .set_view(self.view.center(), self.view.zoom());

        if self.geolocator.is_some() {
            self.request_position(LocateReason::Startup);
        } else {
            log::info!("Geolocation is not available, using the fallback location");
            self.refresh();
        }
    }

    fn handle(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::ViewChanged(viewport) => {
                self.view.viewport = viewport;
                self.debounce_deadline = Some(Instant::now() + self.config.debounce());
            }
            SessionCommand::SetTopRatedOnly(only_top_rated) => {
                log::debug!("Top rated filter set to {only_top_rated}");
                self.view.only_top_rated = only_top_rated;
                self.last_key = None;
                self.refresh();
            }
            SessionCommand::Locate => {
                if self.geolocator.is_some() {
                    self.request_position(LocateReason::UserRequest);
                } else {
                    log::debug!("Locate requested but geolocation is not available");
                }
            }
            SessionCommand::Located { reason, result } => self.on_located(reason, result),
            SessionCommand::FetchCompleted { seq, result } => self.on_fetch_completed(seq, result),
            SessionCommand::Stop => {}
        }
    }

    fn request_position(&self, reason: LocateReason) {
        let Some(geolocator) = self.geolocator.clone() else {
            return;
        };

        let options = self.geolocation_options;
        let sender = self.sender.clone();
        tokio::spawn(async move {
            let result = locate_with_timeout(geolocator.as_ref(), &options).await;
            let _ = sender.send(SessionCommand::Located { reason, result });
        });
    }

    fn on_located(&mut self, reason: LocateReason, result: Result<GeoPoint, GeolocationError>) {
        match (reason, result) {
            (LocateReason::Startup, Ok(position)) => {
                log::info!("Device located at {}, {}", position.lat, position.lng);
                self.recenter(position, self.config.located_zoom);
                self.refresh();
            }
            (LocateReason::Startup, Err(err)) => {
                log::warn!("Could not locate device ({err}), using the fallback location");
                self.refresh();
            }
            (LocateReason::UserRequest, Ok(position)) => {
                log::info!("Device located at {}, {}", position.lat, position.lng);
                self.recenter(position, self.config.locate_zoom);
                self.refresh();
            }
            (LocateReason::UserRequest, Err(err)) => {
                log::warn!("Could not locate device: {err}");
            }
        }
    }

    fn recenter(&mut self, center: GeoPoint, zoom: u32) {
        self.view.viewport.center = center;
        self.view.viewport.zoom = zoom;
        self.surface.set_view(center, zoom);
    }

    fn refresh(&mut self) {
        match self.query_builder.plan(&self.view, self.last_key.as_ref()) {
            QueryPlan::Clear => {
                log::debug!(
                    "Zoom level {} is below {}, clearing markers",
                    self.view.zoom(),
                    self.config.limits.min_zoom
                );
                self.last_key = None;
                self.cleared_at_seq = self.issued_seq;
                self.surface.clear_markers();
            }
            QueryPlan::Skip => {
                log::trace!("View unchanged, skipping request");
            }
            QueryPlan::Fetch { key, query } => {
                log::debug!("Fetching establishments for {key}");
                self.last_key = Some(key);
                self.issued_seq += 1;
                self.spawn_fetch(self.issued_seq, query);
            }
        }
    }

    fn spawn_fetch(&self, seq: u64, query: EstablishmentQuery) {
        let source = self.source.clone();
        let sender = self.sender.clone();
        tokio::spawn(async move {
            let result = source.search(&query).await;
            let _ = sender.send(SessionCommand::FetchCompleted { seq, result });
        });
    }

    fn is_stale(&self, seq: u64) -> bool {
        seq != self.issued_seq || seq <= self.cleared_at_seq
    }

    fn on_fetch_completed(&mut self, seq: u64, result: Result<Vec<Establishment>, FetchError>) {
        if self.config.discard_stale_responses && self.is_stale(seq) {
            log::debug!("Discarding response #{seq}, newest request is #{}", self.issued_seq);
            return;
        }

        match result {
            Ok(establishments) => {
                let markers = self.renderer.render(&establishments);
                log::info!("Showing {} markers", markers.len());
                self.surface.replace_markers(markers);
            }
            Err(err) => {
                log::error!("Failed to load establishments: {err}");
            }
        }
    }
}

/// Handle controlling a running [`MapSession`]. Dropping it stops the session.
pub struct MapSessionHandle {
    sender: mpsc::UnboundedSender<SessionCommand>,
    task: Option<JoinHandle<()>>,
}

impl MapSessionHandle {
    /// Reports that the user finished panning or zooming the map.
    pub fn view_changed(&self, viewport: MapViewport) -> Result<(), SessionError> {
        self.send(SessionCommand::ViewChanged(viewport))
    }

    /// Reports a change of the "only top rated" checkbox.
    pub fn set_top_rated_only(&self, only_top_rated: bool) -> Result<(), SessionError> {
        self.send(SessionCommand::SetTopRatedOnly(only_top_rated))
    }

    /// Centers the map on the device position and loads establishments around it.
    pub fn locate(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::Locate)
    }

    /// Asks the session to stop without waiting for it.
    pub fn stop(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::Stop)
    }

    /// Stops the session and waits until its loop has exited.
    pub async fn shutdown(mut self) {
        let _ = self.send(SessionCommand::Stop);
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                log::error!("Map session task failed: {err}");
            }
        }
    }

    fn send(&self, command: SessionCommand) -> Result<(), SessionError> {
        self.sender
            .send(command)
            .map_err(|_| SessionError::NotRunning)
    }
}

impl Drop for MapSessionHandle {
    fn drop(&mut self) {
        let _ = self.sender.send(SessionCommand::Stop);
    }
}
