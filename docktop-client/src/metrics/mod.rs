pub mod collector;
pub mod docker;
pub mod host;
pub mod types;

pub use collector::Collector;
pub use docker::DockerClient;
pub use host::HostProbe;
