use anyhow::Context;
use sphynx::operation::{CommunityDetection, ExampleGraph};
use sphynx::{OperationRequest, Params, Server, SphynxConfig};
use sphynx_graph_algorithms::Engine;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    println!("Sphynx v{}", sphynx::version());
    println!("==========================================");

    let config = SphynxConfig::load().context("loading configuration")?;
    let server = Server::new(config, Engine::global())?;

    println!("\n=== Operations ===");
    for name in server.registry().names() {
        println!("  {}", name);
    }

    println!("\n=== {} ===", ExampleGraph::NAME);
    let graph = server
        .execute(OperationRequest::new("example", ExampleGraph::NAME))
        .await?;
    for (name, guid) in &graph {
        println!("  {} -> {}", name, guid);
    }

    println!("\n=== {} (PLM) ===", CommunityDetection::NAME);
    let request = OperationRequest::new("communities", CommunityDetection::NAME)
        .with_params(
            Params::new()
                .with("op", "PLM")
                .with("options", Params::new().with("gamma", 1.0).with("seed", 1.0)),
        )
        .with_input("vs", &graph["vertices"])
        .with_input("es", &graph["edges"])
        .with_input("weight", &graph["weight"]);
    let communities = server.execute(request).await?;

    for (name, guid) in &communities {
        let entity = server
            .entity(guid)
            .await
            .with_context(|| format!("output {} was not stored", guid))?;
        println!("{}:\n{}", name, serde_json::to_string_pretty(entity.as_ref())?);
    }

    Ok(())
}
