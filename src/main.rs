mod acquire;
mod audio;
mod config;
mod controller;
mod events;
mod feeds;
mod opener;
mod queue;
mod runtime;
mod store;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
