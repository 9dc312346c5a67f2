use scene::RenderError;
use trip::TripError;

#[derive(thiserror::Error, Debug)]
pub enum SceneError {
    #[error(transparent)]
    Trip(#[from] TripError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("scene has been destroyed")]
    Destroyed,

    #[error("route produced an empty path")]
    EmptyPath,
}
