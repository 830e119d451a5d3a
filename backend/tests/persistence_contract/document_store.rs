//! Local stand-in for the document store's REST surface.
//!
//! Serves `_search`, `_doc`, and `_delete_by_query` over a real socket with
//! the behaviour the gateway relies on: `term` filters against `.keyword`
//! sub-fields, 404 for an index that was never written, and keyword values
//! past the dynamic mapping's `ignore_above` left unindexed.

use std::collections::BTreeMap;
use std::net::TcpListener;
use std::sync::Mutex;
use std::time::Duration;

use actix_web::dev::ServerHandle;
use actix_web::{App, HttpResponse, HttpServer, web};
use borga::outbound::elastic::ElasticPersistence;
use serde_json::{Value, json};
use url::Url;

/// Dynamic mappings stop indexing keyword values longer than this.
const IGNORE_ABOVE: usize = 256;

#[derive(Debug, Default)]
struct Indices {
    documents: BTreeMap<String, BTreeMap<String, Value>>,
    next_id: u64,
}

type Shared = web::Data<Mutex<Indices>>;

/// Running stand-in server.
pub struct DocumentStore {
    base: Url,
    handle: ServerHandle,
    indices: Shared,
}

impl DocumentStore {
    /// Bind an ephemeral port and serve until [`Self::stop`].
    ///
    /// Must run inside an Actix system.
    pub fn spawn() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind document store");
        let addr = listener.local_addr().expect("document store address");
        let indices: Shared = web::Data::new(Mutex::new(Indices::default()));
        let data = indices.clone();
        let server = HttpServer::new(move || App::new().app_data(data.clone()).configure(routes))
            .disable_signals()
            .workers(1)
            .listen(listener)
            .expect("listen on document store socket")
            .run();
        let handle = server.handle();
        actix_web::rt::spawn(server);
        Self {
            base: Url::parse(&format!("http://{addr}/")).expect("document store url"),
            handle,
            indices,
        }
    }

    /// Gateway pointed at this server.
    pub fn gateway(&self) -> ElasticPersistence {
        ElasticPersistence::new(self.base.clone(), Duration::from_secs(5))
            .expect("document store client")
    }

    /// Documents currently held in `index`.
    pub fn count(&self, index: &str) -> usize {
        self.indices
            .lock()
            .expect("document store lock")
            .documents
            .get(index)
            .map_or(0, BTreeMap::len)
    }

    /// Stop serving.
    pub async fn stop(self) {
        self.handle.stop(true).await;
    }
}

fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/{index}/_search", web::post().to(search))
        .route("/{index}/_delete_by_query", web::post().to(delete_by_query))
        .route("/{index}/_doc", web::post().to(create))
        .service(
            web::resource("/{index}/_doc/{id}")
                .route(web::put().to(replace))
                .route(web::delete().to(remove)),
        );
}

fn missing_index(index: &str) -> HttpResponse {
    HttpResponse::NotFound().json(json!({
        "error": { "type": "index_not_found_exception", "index": index },
        "status": 404
    }))
}

/// `(field, value)` pairs of a `bool.filter` list of `term` clauses.
fn terms(body: &Value) -> Vec<(String, String)> {
    body.pointer("/query/bool/filter")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|clause| clause.get("term").and_then(Value::as_object))
        .flat_map(|term| term.iter())
        .filter_map(|(field, value)| {
            let field = field.strip_suffix(".keyword")?;
            Some((field.to_owned(), value.as_str()?.to_owned()))
        })
        .collect()
}

fn matches(source: &Value, terms: &[(String, String)]) -> bool {
    terms.iter().all(|(field, expected)| {
        source
            .get(field)
            .and_then(Value::as_str)
            .is_some_and(|value| value.chars().count() <= IGNORE_ABOVE && value == expected)
    })
}

async fn search(indices: Shared, index: web::Path<String>, body: web::Json<Value>) -> HttpResponse {
    let indices = indices.lock().expect("document store lock");
    let Some(documents) = indices.documents.get(index.as_str()) else {
        return missing_index(&index);
    };
    let terms = terms(&body);
    let hits: Vec<Value> = documents
        .iter()
        .filter(|(_, source)| matches(source, &terms))
        .map(|(id, source)| json!({ "_index": index.as_str(), "_id": id, "_source": source }))
        .collect();
    HttpResponse::Ok().json(json!({
        "took": 1,
        "hits": { "total": { "value": hits.len(), "relation": "eq" }, "hits": hits }
    }))
}

async fn create(indices: Shared, index: web::Path<String>, body: web::Json<Value>) -> HttpResponse {
    let mut indices = indices.lock().expect("document store lock");
    indices.next_id += 1;
    let id = format!("doc-{:06}", indices.next_id);
    indices
        .documents
        .entry(index.into_inner())
        .or_default()
        .insert(id.clone(), body.into_inner());
    HttpResponse::Created().json(json!({ "_id": id, "result": "created" }))
}

async fn replace(
    indices: Shared,
    path: web::Path<(String, String)>,
    body: web::Json<Value>,
) -> HttpResponse {
    let (index, id) = path.into_inner();
    let mut indices = indices.lock().expect("document store lock");
    let previous = indices
        .documents
        .entry(index)
        .or_default()
        .insert(id.clone(), body.into_inner());
    let result = if previous.is_some() { "updated" } else { "created" };
    HttpResponse::Ok().json(json!({ "_id": id, "result": result }))
}

async fn remove(indices: Shared, path: web::Path<(String, String)>) -> HttpResponse {
    let (index, id) = path.into_inner();
    let mut indices = indices.lock().expect("document store lock");
    let removed = indices
        .documents
        .get_mut(&index)
        .and_then(|documents| documents.remove(&id));
    match removed {
        Some(_) => HttpResponse::Ok().json(json!({ "_id": id, "result": "deleted" })),
        None => HttpResponse::NotFound().json(json!({ "_id": id, "result": "not_found" })),
    }
}

async fn delete_by_query(
    indices: Shared,
    index: web::Path<String>,
    body: web::Json<Value>,
) -> HttpResponse {
    let mut indices = indices.lock().expect("document store lock");
    let Some(documents) = indices.documents.get_mut(index.as_str()) else {
        return missing_index(&index);
    };
    let terms = terms(&body);
    let before = documents.len();
    documents.retain(|_, source| !matches(source, &terms));
    HttpResponse::Ok().json(json!({ "deleted": before - documents.len() }))
}
