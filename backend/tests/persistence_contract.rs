//! Persistence contract shared by both adapters.
//!
//! Every case runs against the in-memory store and against the document
//! store adapter talking to a local stand-in server over a real socket.

#[path = "persistence_contract/document_store.rs"]
mod document_store;

use std::net::TcpListener;
use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;

use borga::domain::ports::{MAX_PARAM_CHARS, PersistenceError, PersistenceGateway};
use borga::domain::{GameDetails, GameId, UserToken};
use borga::outbound::elastic::ElasticPersistence;
use borga::outbound::memory::MemoryPersistence;
use rstest::rstest;
use url::Url;

use document_store::DocumentStore;

#[derive(Debug, Clone, Copy)]
enum Backend {
    Memory,
    Elastic,
}

struct Store {
    gateway: Arc<dyn PersistenceGateway>,
    server: Option<DocumentStore>,
}

impl Store {
    fn open(backend: Backend) -> Self {
        match backend {
            Backend::Memory => Self {
                gateway: Arc::new(MemoryPersistence::new()),
                server: None,
            },
            Backend::Elastic => {
                let server = DocumentStore::spawn();
                Self {
                    gateway: Arc::new(server.gateway()),
                    server: Some(server),
                }
            }
        }
    }

    /// Documents left in `index`, when the backend is the document store.
    fn stored(&self, index: &str) -> Option<usize> {
        self.server.as_ref().map(|server| server.count(index))
    }

    async fn close(self) {
        if let Some(server) = self.server {
            server.stop().await;
        }
    }
}

impl Deref for Store {
    type Target = dyn PersistenceGateway;

    fn deref(&self) -> &Self::Target {
        self.gateway.as_ref()
    }
}

fn details(id: &str, name: &str) -> GameDetails {
    GameDetails {
        id: id.to_owned(),
        name: name.to_owned(),
        thumb_url: Some(format!("https://images.example/{id}.png")),
        ..GameDetails::default()
    }
}

async fn alice(store: &Store) -> UserToken {
    store
        .create_user("Alice", "$argon2id$stub")
        .await
        .expect("user created")
        .token
}

async fn alice_with_group(store: &Store, group: &str) -> UserToken {
    let user = alice(store).await;
    store
        .create_group(&user, group, "desc")
        .await
        .expect("group created");
    user
}

#[rstest]
#[case::memory(Backend::Memory)]
#[case::elastic(Backend::Elastic)]
#[actix_rt::test]
async fn lookups_on_an_empty_store_find_nothing(#[case] backend: Backend) {
    let store = Store::open(backend);

    assert_eq!(
        store.get_user_by_username("Alice").await,
        Err(PersistenceError::not_found("User does not exist."))
    );
    assert_eq!(
        store.get_user_by_token(&UserToken::new("tok")).await,
        Err(PersistenceError::UserNotFound)
    );
    store.close().await;
}

#[rstest]
#[case::memory(Backend::Memory)]
#[case::elastic(Backend::Elastic)]
#[actix_rt::test]
async fn users_resolve_by_token_and_name(#[case] backend: Backend) {
    let store = Store::open(backend);
    let token = alice(&store).await;

    let by_token = store.get_user_by_token(&token).await.expect("by token");
    let by_name = store.get_user_by_username("Alice").await.expect("by name");
    assert_eq!(by_token, by_name);
    assert_eq!(by_token.password_hash, "$argon2id$stub");
    store.close().await;
}

#[rstest]
#[case::memory(Backend::Memory)]
#[case::elastic(Backend::Elastic)]
#[actix_rt::test]
async fn usernames_are_unique(#[case] backend: Backend) {
    let store = Store::open(backend);
    alice(&store).await;

    let err = store
        .create_user("Alice", "$argon2id$other")
        .await
        .expect_err("taken");
    assert_eq!(err, PersistenceError::conflict("User already exists."));
    store.close().await;
}

#[rstest]
#[case::memory(Backend::Memory)]
#[case::elastic(Backend::Elastic)]
#[actix_rt::test]
async fn created_group_reads_back_empty(#[case] backend: Backend) {
    let store = Store::open(backend);
    let user = alice_with_group(&store, "Strategy").await;

    let group = store
        .get_group_details(&user, "Strategy")
        .await
        .expect("lookup")
        .expect("group present");
    assert_eq!(group.name, "Strategy");
    assert_eq!(group.description, "desc");
    assert_eq!(group.owner, user);
    assert!(group.games.is_empty());
    assert!(
        store
            .get_group_details(&user, "Other")
            .await
            .expect("lookup")
            .is_none()
    );
    store.close().await;
}

#[rstest]
#[case::memory(Backend::Memory)]
#[case::elastic(Backend::Elastic)]
#[actix_rt::test]
async fn duplicate_group_names_conflict_and_keep_the_original(#[case] backend: Backend) {
    let store = Store::open(backend);
    let user = alice_with_group(&store, "Strategy").await;

    let err = store
        .create_group(&user, "Strategy", "second")
        .await
        .expect_err("duplicate");
    assert_eq!(err, PersistenceError::conflict("Group Name already exists."));

    let groups = store.list_all_groups(&user).await.expect("list");
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].description, "desc");
    store.close().await;
}

#[rstest]
#[case::memory(Backend::Memory)]
#[case::elastic(Backend::Elastic)]
#[actix_rt::test]
async fn group_names_are_scoped_to_their_owner(#[case] backend: Backend) {
    let store = Store::open(backend);
    let alice = alice_with_group(&store, "Strategy").await;
    let bob = store
        .create_user("Bob", "$argon2id$stub")
        .await
        .expect("bob created")
        .token;

    store
        .create_group(&bob, "Strategy", "bob's")
        .await
        .expect("same name, other owner");
    store
        .add_game_to_group(&bob, "Strategy", &details("G1", "Root"))
        .await
        .expect("added");

    let alices = store.list_all_groups(&alice).await.expect("list");
    assert_eq!(alices.len(), 1);
    assert!(alices[0].games.is_empty());
    store.close().await;
}

#[rstest]
#[case::memory(Backend::Memory)]
#[case::elastic(Backend::Elastic)]
#[actix_rt::test]
async fn add_then_remove_restores_the_group(#[case] backend: Backend) {
    let store = Store::open(backend);
    let user = alice_with_group(&store, "Strategy").await;
    let before = store.list_all_groups(&user).await.expect("list");

    let added = store
        .add_game_to_group(&user, "Strategy", &details("G1", "Root"))
        .await
        .expect("added");
    assert_eq!(added.group_id, before[0].id);
    assert_eq!(
        added.image_url.as_deref(),
        Some("https://images.example/G1.png")
    );
    let removed = store
        .remove_game_from_group(&user, "Strategy", &GameId::new("G1"))
        .await
        .expect("removed");

    assert_eq!(removed, added);
    assert_eq!(store.list_all_groups(&user).await.expect("list"), before);
    store.close().await;
}

#[rstest]
#[case::memory(Backend::Memory)]
#[case::elastic(Backend::Elastic)]
#[actix_rt::test]
async fn adding_a_game_twice_conflicts(#[case] backend: Backend) {
    let store = Store::open(backend);
    let user = alice_with_group(&store, "Strategy").await;
    store
        .add_game_to_group(&user, "Strategy", &details("G1", "Root"))
        .await
        .expect("added");

    let err = store
        .add_game_to_group(&user, "Strategy", &details("G1", "Root"))
        .await
        .expect_err("duplicate game");
    assert_eq!(err, PersistenceError::conflict("Game already exists"));
    store.close().await;
}

#[rstest]
#[case::memory(Backend::Memory)]
#[case::elastic(Backend::Elastic)]
#[actix_rt::test]
async fn removing_an_unknown_game_is_not_found(#[case] backend: Backend) {
    let store = Store::open(backend);
    let user = alice_with_group(&store, "Strategy").await;

    let err = store
        .remove_game_from_group(&user, "Strategy", &GameId::new("nope"))
        .await
        .expect_err("unknown game");
    assert_eq!(err, PersistenceError::not_found("Game not found"));
    store.close().await;
}

#[rstest]
#[case::memory(Backend::Memory)]
#[case::elastic(Backend::Elastic)]
#[actix_rt::test]
async fn game_operations_on_missing_groups_are_not_found(#[case] backend: Backend) {
    let store = Store::open(backend);
    let user = alice(&store).await;

    let err = store
        .add_game_to_group(&user, "Ghost", &details("G1", "Root"))
        .await
        .expect_err("no group");
    assert_eq!(err, PersistenceError::not_found("Group not found"));
    let err = store
        .remove_game_from_group(&user, "Ghost", &GameId::new("G1"))
        .await
        .expect_err("no group");
    assert_eq!(err, PersistenceError::not_found("Group not found"));
    store.close().await;
}

#[rstest]
#[case::memory(Backend::Memory)]
#[case::elastic(Backend::Elastic)]
#[actix_rt::test]
async fn edit_keeps_games_and_identity(#[case] backend: Backend) {
    let store = Store::open(backend);
    let user = alice(&store).await;
    let created = store
        .create_group(&user, "Strategy", "desc")
        .await
        .expect("group created");
    store
        .add_game_to_group(&user, "Strategy", &details("G1", "Root"))
        .await
        .expect("added");

    let edited = store
        .edit_group(&user, "Strategy", "Favourites", "new desc")
        .await
        .expect("edited");

    assert_eq!(edited.id, created.id);
    assert_eq!(edited.name, "Favourites");
    assert_eq!(edited.description, "new desc");
    assert_eq!(edited.games.len(), 1);
    assert!(
        store
            .get_group_details(&user, "Strategy")
            .await
            .expect("lookup")
            .is_none()
    );
    let reread = store
        .get_group_details(&user, "Favourites")
        .await
        .expect("lookup")
        .expect("renamed group");
    assert_eq!(reread, edited);
    assert_eq!(store.stored("groups"), store.server.as_ref().map(|_| 1));
    store.close().await;
}

#[rstest]
#[case::memory(Backend::Memory)]
#[case::elastic(Backend::Elastic)]
#[actix_rt::test]
async fn edit_may_keep_the_name_and_change_the_description(#[case] backend: Backend) {
    let store = Store::open(backend);
    let user = alice_with_group(&store, "Strategy").await;

    let edited = store
        .edit_group(&user, "Strategy", "Strategy", "")
        .await
        .expect("edited in place");
    assert_eq!(edited.description, "");
    store.close().await;
}

#[rstest]
#[case::memory(Backend::Memory)]
#[case::elastic(Backend::Elastic)]
#[actix_rt::test]
async fn edit_onto_an_existing_name_conflicts(#[case] backend: Backend) {
    let store = Store::open(backend);
    let user = alice_with_group(&store, "A").await;
    store
        .create_group(&user, "B", "desc")
        .await
        .expect("group created");

    let err = store
        .edit_group(&user, "A", "B", "desc")
        .await
        .expect_err("taken");
    assert_eq!(err, PersistenceError::conflict("Group Name already exists."));
    store.close().await;
}

#[rstest]
#[case::memory(Backend::Memory)]
#[case::elastic(Backend::Elastic)]
#[actix_rt::test]
async fn editing_a_missing_group_is_not_found_even_onto_a_taken_name(#[case] backend: Backend) {
    let store = Store::open(backend);
    let user = alice_with_group(&store, "B").await;

    let err = store
        .edit_group(&user, "Ghost", "B", "desc")
        .await
        .expect_err("absent source");
    assert_eq!(err, PersistenceError::not_found("Group not found"));
    store.close().await;
}

#[rstest]
#[case::memory(Backend::Memory)]
#[case::elastic(Backend::Elastic)]
#[actix_rt::test]
async fn deleting_a_group_drops_its_games(#[case] backend: Backend) {
    let store = Store::open(backend);
    let user = alice_with_group(&store, "Strategy").await;
    store
        .add_game_to_group(&user, "Strategy", &details("G1", "Root"))
        .await
        .expect("added");

    let deleted = store
        .delete_group(&user, "Strategy")
        .await
        .expect("deleted");
    assert_eq!(deleted.games.len(), 1);

    let err = store
        .delete_group(&user, "Strategy")
        .await
        .expect_err("already gone");
    assert_eq!(err, PersistenceError::not_found("Group not found"));

    store
        .create_group(&user, "Strategy", "again")
        .await
        .expect("name free again");
    let group = store
        .get_group_details(&user, "Strategy")
        .await
        .expect("lookup")
        .expect("present");
    assert!(group.games.is_empty());
    assert_eq!(store.stored("games"), store.server.as_ref().map(|_| 0));
    store.close().await;
}

#[rstest]
#[case::memory(Backend::Memory)]
#[case::elastic(Backend::Elastic)]
#[actix_rt::test]
async fn listing_populates_every_group(#[case] backend: Backend) {
    let store = Store::open(backend);
    let user = alice(&store).await;
    for (group, game) in [("A", "G1"), ("B", "G2"), ("C", "G3")] {
        store
            .create_group(&user, group, "desc")
            .await
            .expect("group created");
        store
            .add_game_to_group(&user, group, &details(game, "Root"))
            .await
            .expect("added");
    }

    let groups = store.list_all_groups(&user).await.expect("list");
    let summary: Vec<_> = groups
        .iter()
        .map(|group| (group.name.as_str(), group.games[0].id.as_str()))
        .collect();
    assert_eq!(summary, vec![("A", "G1"), ("B", "G2"), ("C", "G3")]);
    store.close().await;
}

#[rstest]
#[case::memory(Backend::Memory, UserToken::new(""), PersistenceError::MissingUser)]
#[case::memory(Backend::Memory, UserToken::new("unknown"), PersistenceError::UserNotFound)]
#[case::elastic(Backend::Elastic, UserToken::new(""), PersistenceError::MissingUser)]
#[case::elastic(Backend::Elastic, UserToken::new("unknown"), PersistenceError::UserNotFound)]
#[actix_rt::test]
async fn unresolved_users_are_rejected(
    #[case] backend: Backend,
    #[case] token: UserToken,
    #[case] expected: PersistenceError,
) {
    let store = Store::open(backend);
    alice(&store).await;

    let err = store
        .create_group(&token, "Strategy", "desc")
        .await
        .expect_err("bad user");
    assert_eq!(err, expected);
    let err = store.list_all_groups(&token).await.expect_err("bad user");
    assert_eq!(err, expected);
    let err = store
        .delete_user_by_token(&token)
        .await
        .expect_err("bad user");
    assert_eq!(err, expected);
    store.close().await;
}

#[rstest]
#[case::memory(Backend::Memory)]
#[case::elastic(Backend::Elastic)]
#[actix_rt::test]
async fn required_names_must_be_present_and_indexable(#[case] backend: Backend) {
    let store = Store::open(backend);
    let user = alice(&store).await;

    let err = store
        .create_group(&user, " ", "desc")
        .await
        .expect_err("blank");
    assert_eq!(err, PersistenceError::MissingParameter);

    let long = "x".repeat(MAX_PARAM_CHARS + 1);
    let err = store
        .create_group(&user, &long, "desc")
        .await
        .expect_err("too long");
    assert_eq!(err, PersistenceError::ParameterTooLong);

    let longest = "x".repeat(MAX_PARAM_CHARS);
    store
        .create_group(&user, &longest, "desc")
        .await
        .expect("at the cap");
    assert!(
        store
            .get_group_details(&user, &longest)
            .await
            .expect("lookup")
            .is_some()
    );
    store.close().await;
}

#[rstest]
#[case::memory(Backend::Memory)]
#[case::elastic(Backend::Elastic)]
#[actix_rt::test]
async fn deleting_a_user_cascades_to_groups_and_games(#[case] backend: Backend) {
    let store = Store::open(backend);
    let user = alice_with_group(&store, "Strategy").await;
    store
        .add_game_to_group(&user, "Strategy", &details("G1", "Root"))
        .await
        .expect("added");

    store.delete_user_by_token(&user).await.expect("deleted");

    assert_eq!(
        store.get_user_by_token(&user).await,
        Err(PersistenceError::UserNotFound)
    );
    for index in ["users", "groups", "games"] {
        assert_eq!(store.stored(index), store.server.as_ref().map(|_| 0));
    }
    let again = store
        .create_user("Alice", "$argon2id$stub")
        .await
        .expect("name free again");
    assert!(
        store
            .list_all_groups(&again.token)
            .await
            .expect("list")
            .is_empty()
    );
    store.close().await;
}

#[rstest]
#[case::memory(Backend::Memory)]
#[case::elastic(Backend::Elastic)]
#[actix_rt::test]
async fn deleting_by_username_cascades_too(#[case] backend: Backend) {
    let store = Store::open(backend);
    let user = alice_with_group(&store, "Strategy").await;

    store
        .delete_user_by_username("Alice")
        .await
        .expect("deleted");

    assert_eq!(
        store.get_user_by_token(&user).await,
        Err(PersistenceError::UserNotFound)
    );
    assert_eq!(store.stored("groups"), store.server.as_ref().map(|_| 0));
    assert_eq!(
        store.delete_user_by_username("Alice").await,
        Err(PersistenceError::not_found("User does not exist."))
    );
    store.close().await;
}

#[rstest]
#[case::memory(Backend::Memory)]
#[case::elastic(Backend::Elastic)]
#[actix_rt::test]
async fn alice_curates_a_group_end_to_end(#[case] backend: Backend) {
    let store = Store::open(backend);
    let user = alice_with_group(&store, "Strategy").await;
    store
        .add_game_to_group(&user, "Strategy", &details("G1", "Root"))
        .await
        .expect("added");

    let groups = store.list_all_groups(&user).await.expect("list");
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].games.len(), 1);
    assert_eq!(groups[0].games[0].id, GameId::new("G1"));

    store
        .remove_game_from_group(&user, "Strategy", &GameId::new("G1"))
        .await
        .expect("removed");
    let group = store
        .get_group_details(&user, "Strategy")
        .await
        .expect("lookup")
        .expect("present");
    assert!(group.games.is_empty());

    store
        .delete_group(&user, "Strategy")
        .await
        .expect("deleted");
    assert!(store.list_all_groups(&user).await.expect("list").is_empty());
    store.close().await;
}

#[actix_rt::test]
async fn an_unreachable_store_is_a_store_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("address");
    drop(listener);
    let base = Url::parse(&format!("http://{addr}/")).expect("url");
    let gateway = ElasticPersistence::new(base, Duration::from_secs(2)).expect("client");

    let err = gateway
        .get_user_by_username("Alice")
        .await
        .expect_err("connection refused");
    assert!(matches!(err, PersistenceError::Store { .. }));
}
