use routing::RoadRouter;
use scene::Renderer;
use tracing::debug;
use trip::{Mode, Stop};

use crate::error::SceneError;
use crate::lifecycle::TripScene;
use crate::profile::SceneOptions;

/// Holds the single live scene of an application.
pub struct Stage<R: Renderer> {
    scene: Option<TripScene<R>>,
}

impl<R: Renderer> Default for Stage<R> {
    fn default() -> Self {
        Self { scene: None }
    }
}

impl<R: Renderer> Stage<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Destroy the current scene, then build a new one.
    ///
    /// The previous scene is gone even when the new build fails.
    pub async fn load<Q: RoadRouter + ?Sized>(
        &mut self,
        renderer: R,
        stops: Vec<Stop>,
        modes: Vec<Mode>,
        options: SceneOptions,
        router: &Q,
    ) -> Result<&mut TripScene<R>, SceneError> {
        self.unload();
        let scene = TripScene::create(renderer, stops, modes, options, router).await?;
        Ok(self.scene.insert(scene))
    }

    pub fn unload(&mut self) {
        if let Some(mut previous) = self.scene.take() {
            debug!("replacing live trip scene");
            previous.destroy();
        }
    }

    pub fn scene(&self) -> Option<&TripScene<R>> {
        self.scene.as_ref()
    }

    pub fn scene_mut(&mut self) -> Option<&mut TripScene<R>> {
        self.scene.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::Stage;
    use crate::lifecycle::{PlaybackOutcome, SceneState};
    use crate::profile::SceneOptions;
    use routing::OfflineRouter;
    use scene::World;
    use trip::Stop;

    fn options() -> SceneOptions {
        let mut options = SceneOptions::flat_map();
        options.playback.warm_up.frame_delay_ms = 0;
        options
    }

    fn stops(lon: f64) -> Vec<Stop> {
        vec![Stop::new("A", "", lon, 0.0), Stop::new("B", "", lon + 1.0, 0.0)]
    }

    #[tokio::test]
    async fn loading_replaces_previous_scene() {
        let mut stage = Stage::new();
        let first = stage
            .load(World::new(), stops(0.0), Vec::new(), options(), &OfflineRouter)
            .await
            .unwrap();
        let mut completion = first.play(|_| {});
        first.tick(0.1);

        stage
            .load(World::new(), stops(10.0), Vec::new(), options(), &OfflineRouter)
            .await
            .unwrap();
        assert_eq!(completion.try_outcome(), Some(PlaybackOutcome::Cancelled));
        let live = stage.scene().unwrap();
        assert_eq!(live.state(), SceneState::Ready);
        assert_eq!(live.stops()[0].lon, 10.0);
    }

    #[tokio::test]
    async fn failed_load_leaves_stage_empty() {
        let mut stage = Stage::new();
        stage
            .load(World::new(), stops(0.0), Vec::new(), options(), &OfflineRouter)
            .await
            .unwrap();
        let result = stage
            .load(World::new(), Vec::new(), Vec::new(), options(), &OfflineRouter)
            .await;
        assert!(result.is_err());
        assert!(stage.scene().is_none());
    }
}
