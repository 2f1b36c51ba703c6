//! Catalog requests run off the UI thread. Each request gets its own short
//! thread so a slow lookup never delays a newer one; the app model decides
//! which replies are still wanted.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender, TryIter};
use std::thread;

use tracing::{debug, warn};

use crate::catalog::{AlbumDetail, ArtistCatalog, CatalogClient};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogRequest {
    Search { seq: u64, term: String },
    Album(u64),
}

#[derive(Debug)]
pub enum CatalogReply {
    Search {
        seq: u64,
        result: Result<ArtistCatalog, String>,
    },
    Album {
        id: u64,
        result: Result<AlbumDetail, String>,
    },
}

pub struct CatalogWorker {
    tx: Sender<CatalogRequest>,
    rx: Receiver<CatalogReply>,
}

impl CatalogWorker {
    pub fn spawn(client: CatalogClient) -> Self {
        let client = Arc::new(client);
        let (req_tx, req_rx) = mpsc::channel::<CatalogRequest>();
        let (reply_tx, reply_rx) = mpsc::channel::<CatalogReply>();

        let spawned = thread::Builder::new()
            .name("encore-catalog".into())
            .spawn(move || {
                for req in req_rx {
                    let client = Arc::clone(&client);
                    let reply_tx = reply_tx.clone();
                    thread::spawn(move || {
                        let reply = serve(&client, req);
                        // The UI may already be gone.
                        let _ = reply_tx.send(reply);
                    });
                }
                debug!("catalog worker stopped");
            });
        if let Err(e) = spawned {
            warn!(error = %e, "failed to spawn catalog worker");
        }

        Self {
            tx: req_tx,
            rx: reply_rx,
        }
    }

    pub fn request(&self, req: CatalogRequest) {
        if self.tx.send(req).is_err() {
            warn!("catalog worker is gone, dropping request");
        }
    }

    /// Replies received so far, without blocking.
    pub fn replies(&self) -> TryIter<'_, CatalogReply> {
        self.rx.try_iter()
    }

    #[cfg(test)]
    pub(crate) fn from_channels(tx: Sender<CatalogRequest>, rx: Receiver<CatalogReply>) -> Self {
        Self { tx, rx }
    }
}

fn serve(client: &CatalogClient, req: CatalogRequest) -> CatalogReply {
    match req {
        CatalogRequest::Search { seq, term } => CatalogReply::Search {
            seq,
            result: client.search_artist(&term).map_err(|e| e.to_string()),
        },
        CatalogRequest::Album(id) => CatalogReply::Album {
            id,
            result: client.lookup_album(id).map_err(|e| e.to_string()),
        },
    }
}
