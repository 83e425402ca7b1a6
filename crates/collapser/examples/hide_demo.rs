//! Hide demo - load a captured page, hide and collapse a few elements

use collapser::{ElementSuppressor, SuppressionEvent};
use dom::{parse_cdp_document_str, DomSerializer};
use std::sync::Arc;
use tokio::sync::RwLock;

const PAGE: &str = r##"{
  "root": {
    "nodeId": 1, "backendNodeId": 1, "nodeType": 9, "nodeName": "#document",
    "children": [{
      "nodeId": 2, "backendNodeId": 2, "nodeType": 1, "nodeName": "HTML",
      "children": [
        { "nodeId": 3, "backendNodeId": 3, "nodeType": 1, "nodeName": "HEAD" },
        {
          "nodeId": 4, "backendNodeId": 4, "nodeType": 1, "nodeName": "BODY",
          "children": [
            { "nodeId": 5, "backendNodeId": 5, "nodeType": 1, "nodeName": "DIV",
              "attributes": ["class", "content"] },
            { "nodeId": 6, "backendNodeId": 6, "nodeType": 1, "nodeName": "DIV",
              "attributes": ["class", "banner"] },
            { "nodeId": 7, "backendNodeId": 7, "nodeType": 1, "nodeName": "IMG",
              "attributes": ["src", "https://ads.example/pixel.gif"] },
            { "nodeId": 8, "backendNodeId": 8, "nodeType": 1, "nodeName": "IFRAME" }
          ]
        }
      ]
    }]
  }
}"##;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let arena = parse_cdp_document_str(PAGE)?;
    let lookup = |backend_id| {
        arena
            .get_node_id_by_backend(backend_id)
            .ok_or_else(|| format!("node {} missing from snapshot", backend_id))
    };
    let banner = lookup(6)?;
    let pixel = lookup(7)?;
    let frame = lookup(8)?;

    let suppressor = ElementSuppressor::new(Arc::new(RwLock::new(arena)));
    let mut events = suppressor.subscribe();

    suppressor.hide_element(banner, None).await?;
    suppressor.hide_element(frame, None).await?;
    suppressor.collapse_element(pixel, None).await?;
    println!("Hidden elements: {}", suppressor.hidden_count());

    while let Ok(event) = events.try_recv() {
        if let SuppressionEvent::RuleInserted { rule, .. } = event {
            println!("Inserted: {}", rule);
        }
    }

    let document = suppressor.document();
    let html = DomSerializer::new().serialize(&*document.read().await)?;
    println!("{}", html);

    Ok(())
}
