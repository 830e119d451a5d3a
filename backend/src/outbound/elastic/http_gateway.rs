//! Reqwest-backed persistence over an Elasticsearch-compatible REST API.
//!
//! Writes use `?refresh=true` so a read issued right after a write observes
//! it. Concurrent writers are not coordinated; two racing "create group"
//! calls with the same name can both succeed.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::try_join_all;
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::dto::{
    DeleteByQueryResponseDto, GameDocument, GroupDocument, HitDto, IndexResponseDto,
    SearchResponseDto, UserDocument, delete_by_query_body, search_body,
};
use crate::domain::ports::messages::{
    GAME_EXISTS, GAME_NOT_FOUND, GROUP_EXISTS, GROUP_NOT_FOUND, USER_DOES_NOT_EXIST, USER_EXISTS,
};
use crate::domain::ports::{PersistenceError, PersistenceGateway, require_params, require_user};
use crate::domain::{Game, GameDetails, GameId, Group, GroupId, User, UserToken};

const USERS: &str = "users";
const GROUPS: &str = "groups";
const GAMES: &str = "games";

/// Document-store [`PersistenceGateway`].
pub struct ElasticPersistence {
    client: Client,
    base: Url,
}

impl ElasticPersistence {
    /// Build an adapter for the store rooted at `base`.
    ///
    /// # Errors
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base: with_trailing_slash(base),
        })
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, PersistenceError> {
        let url = self
            .base
            .join(path)
            .map_err(|err| PersistenceError::store(format!("invalid store path {path}: {err}")))?;
        Ok(self.client.request(method, url))
    }

    async fn search<T: DeserializeOwned>(
        &self,
        index: &str,
        filters: &[(&str, &str)],
    ) -> Result<Vec<HitDto<T>>, PersistenceError> {
        let response = self
            .request(Method::POST, &format!("{index}/_search"))?
            .json(&search_body(filters))
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        // A missing index means nothing was ever written.
        if status == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        let body = read_success(response, status).await?;
        let decoded: SearchResponseDto<T> = decode(&body)?;
        Ok(decoded.hits.hits)
    }

    async fn index_document<T: Serialize + Sync>(
        &self,
        index: &str,
        document: &T,
    ) -> Result<String, PersistenceError> {
        let response = self
            .request(Method::POST, &format!("{index}/_doc?refresh=true"))?
            .json(document)
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        let body = read_success(response, status).await?;
        let decoded: IndexResponseDto = decode(&body)?;
        Ok(decoded.id)
    }

    async fn replace_document<T: Serialize + Sync>(
        &self,
        index: &str,
        id: &str,
        document: &T,
    ) -> Result<(), PersistenceError> {
        let response = self
            .request(Method::PUT, &format!("{index}/_doc/{id}?refresh=true"))?
            .json(document)
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        read_success(response, status).await.map(|_| ())
    }

    async fn delete_document(&self, index: &str, id: &str) -> Result<(), PersistenceError> {
        let response = self
            .request(Method::DELETE, &format!("{index}/_doc/{id}?refresh=true"))?
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        read_success(response, status).await.map(|_| ())
    }

    async fn delete_by_query(
        &self,
        index: &str,
        filters: &[(&str, &str)],
    ) -> Result<u64, PersistenceError> {
        let response = self
            .request(
                Method::POST,
                &format!("{index}/_delete_by_query?refresh=true"),
            )?
            .json(&delete_by_query_body(filters))
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(0);
        }
        let body = read_success(response, status).await?;
        let decoded: DeleteByQueryResponseDto = decode(&body)?;
        Ok(decoded.deleted)
    }

    async fn find_user(
        &self,
        field: &str,
        value: &str,
    ) -> Result<Option<HitDto<UserDocument>>, PersistenceError> {
        Ok(self
            .search::<UserDocument>(USERS, &[(field, value)])
            .await?
            .into_iter()
            .next())
    }

    /// Resolve the acting user, failing per the gateway contract.
    async fn ensure_user(&self, token: &UserToken) -> Result<HitDto<UserDocument>, PersistenceError> {
        require_user(token)?;
        self.find_user("token", token.as_str())
            .await?
            .ok_or(PersistenceError::UserNotFound)
    }

    async fn find_group(
        &self,
        owner: &UserToken,
        name: &str,
    ) -> Result<Option<HitDto<GroupDocument>>, PersistenceError> {
        Ok(self
            .search::<GroupDocument>(GROUPS, &[("owner", owner.as_str()), ("name", name)])
            .await?
            .into_iter()
            .next())
    }

    async fn games_of(&self, group_id: &str) -> Result<Vec<Game>, PersistenceError> {
        Ok(self
            .search::<GameDocument>(GAMES, &[("groupId", group_id)])
            .await?
            .into_iter()
            .map(|hit| hit.source.into_domain())
            .collect())
    }

    async fn populate(&self, hit: HitDto<GroupDocument>) -> Result<Group, PersistenceError> {
        let games = self.games_of(&hit.id).await?;
        Ok(hit.source.into_domain(hit.id, games))
    }

    async fn existing_group(
        &self,
        owner: &UserToken,
        name: &str,
    ) -> Result<HitDto<GroupDocument>, PersistenceError> {
        self.find_group(owner, name)
            .await?
            .ok_or_else(|| PersistenceError::not_found(GROUP_NOT_FOUND))
    }

    async fn delete_user_cascade(&self, user: HitDto<UserDocument>) -> Result<(), PersistenceError> {
        let owner = user.source.token.as_str();
        let groups = self.search::<GroupDocument>(GROUPS, &[("owner", owner)]).await?;
        for group in &groups {
            self.delete_by_query(GAMES, &[("groupId", group.id.as_str())])
                .await?;
        }
        self.delete_by_query(GROUPS, &[("owner", owner)]).await?;
        self.delete_document(USERS, &user.id).await?;
        debug!(groups = groups.len(), "user removed with groups");
        Ok(())
    }
}

#[async_trait]
impl PersistenceGateway for ElasticPersistence {
    async fn create_user(
        &self,
        name: &str,
        password_hash: &str,
    ) -> Result<User, PersistenceError> {
        require_params(&[name, password_hash])?;
        if self.find_user("name", name).await?.is_some() {
            return Err(PersistenceError::conflict(USER_EXISTS));
        }
        let document = UserDocument {
            token: UserToken::generate().as_str().to_owned(),
            name: name.to_owned(),
            password_hash: password_hash.to_owned(),
        };
        self.index_document(USERS, &document).await?;
        Ok(document.into_domain())
    }

    async fn get_user_by_token(&self, token: &UserToken) -> Result<User, PersistenceError> {
        self.ensure_user(token)
            .await
            .map(|hit| hit.source.into_domain())
    }

    async fn get_user_by_username(&self, name: &str) -> Result<User, PersistenceError> {
        require_params(&[name])?;
        self.find_user("name", name)
            .await?
            .map(|hit| hit.source.into_domain())
            .ok_or_else(|| PersistenceError::not_found(USER_DOES_NOT_EXIST))
    }

    async fn delete_user_by_token(&self, token: &UserToken) -> Result<(), PersistenceError> {
        let user = self.ensure_user(token).await?;
        self.delete_user_cascade(user).await
    }

    async fn delete_user_by_username(&self, name: &str) -> Result<(), PersistenceError> {
        require_params(&[name])?;
        let user = self
            .find_user("name", name)
            .await?
            .ok_or_else(|| PersistenceError::not_found(USER_DOES_NOT_EXIST))?;
        self.delete_user_cascade(user).await
    }

    async fn create_group(
        &self,
        user: &UserToken,
        name: &str,
        description: &str,
    ) -> Result<Group, PersistenceError> {
        self.ensure_user(user).await?;
        require_params(&[name])?;
        if self.find_group(user, name).await?.is_some() {
            return Err(PersistenceError::conflict(GROUP_EXISTS));
        }
        let document = GroupDocument {
            owner: user.as_str().to_owned(),
            name: name.to_owned(),
            description: description.to_owned(),
        };
        let id = self.index_document(GROUPS, &document).await?;
        Ok(document.into_domain(id, Vec::new()))
    }

    async fn edit_group(
        &self,
        user: &UserToken,
        old_name: &str,
        new_name: &str,
        description: &str,
    ) -> Result<Group, PersistenceError> {
        self.ensure_user(user).await?;
        require_params(&[old_name, new_name])?;
        let existing = self.existing_group(user, old_name).await?;
        if old_name != new_name && self.find_group(user, new_name).await?.is_some() {
            return Err(PersistenceError::conflict(GROUP_EXISTS));
        }
        let document = GroupDocument {
            owner: user.as_str().to_owned(),
            name: new_name.to_owned(),
            description: description.to_owned(),
        };
        // Same document id, so the group's games stay attached.
        self.replace_document(GROUPS, &existing.id, &document)
            .await?;
        let games = self.games_of(&existing.id).await?;
        Ok(document.into_domain(existing.id, games))
    }

    async fn list_all_groups(&self, user: &UserToken) -> Result<Vec<Group>, PersistenceError> {
        self.ensure_user(user).await?;
        let hits = self
            .search::<GroupDocument>(GROUPS, &[("owner", user.as_str())])
            .await?;
        try_join_all(hits.into_iter().map(|hit| self.populate(hit))).await
    }

    async fn get_group_details(
        &self,
        user: &UserToken,
        name: &str,
    ) -> Result<Option<Group>, PersistenceError> {
        self.ensure_user(user).await?;
        require_params(&[name])?;
        match self.find_group(user, name).await? {
            Some(hit) => self.populate(hit).await.map(Some),
            None => Ok(None),
        }
    }

    async fn delete_group(&self, user: &UserToken, name: &str) -> Result<Group, PersistenceError> {
        self.ensure_user(user).await?;
        require_params(&[name])?;
        let hit = self.existing_group(user, name).await?;
        let group = self.populate(hit).await?;
        self.delete_by_query(GAMES, &[("groupId", group.id.as_str())])
            .await?;
        self.delete_document(GROUPS, group.id.as_str()).await?;
        Ok(group)
    }

    async fn add_game_to_group(
        &self,
        user: &UserToken,
        group_name: &str,
        game: &GameDetails,
    ) -> Result<Game, PersistenceError> {
        self.ensure_user(user).await?;
        require_params(&[group_name, game.id.as_str()])?;
        let group = self.existing_group(user, group_name).await?;
        let duplicates = self
            .search::<GameDocument>(
                GAMES,
                &[("groupId", group.id.as_str()), ("id", game.id.as_str())],
            )
            .await?;
        if !duplicates.is_empty() {
            return Err(PersistenceError::conflict(GAME_EXISTS));
        }
        let document = GameDocument::from_details(&GroupId::new(group.id), game);
        self.index_document(GAMES, &document).await?;
        Ok(document.into_domain())
    }

    async fn remove_game_from_group(
        &self,
        user: &UserToken,
        group_name: &str,
        game_id: &GameId,
    ) -> Result<Game, PersistenceError> {
        self.ensure_user(user).await?;
        require_params(&[group_name, game_id.as_str()])?;
        let group = self.existing_group(user, group_name).await?;
        let hit = self
            .search::<GameDocument>(
                GAMES,
                &[("groupId", group.id.as_str()), ("id", game_id.as_str())],
            )
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| PersistenceError::not_found(GAME_NOT_FOUND))?;
        self.delete_document(GAMES, &hit.id).await?;
        Ok(hit.source.into_domain())
    }
}

fn with_trailing_slash(mut base: Url) -> Url {
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base
}

async fn read_success(
    response: reqwest::Response,
    status: StatusCode,
) -> Result<Vec<u8>, PersistenceError> {
    let body = response.bytes().await.map_err(map_transport_error)?;
    if !status.is_success() {
        return Err(map_status_error(status, &body));
    }
    Ok(body.to_vec())
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, PersistenceError> {
    serde_json::from_slice(body)
        .map_err(|err| PersistenceError::store(format!("invalid store response: {err}")))
}

fn map_transport_error(error: reqwest::Error) -> PersistenceError {
    PersistenceError::store(error.to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> PersistenceError {
    const PREVIEW_CHAR_LIMIT: usize = 160;
    let preview: String = String::from_utf8_lossy(body)
        .chars()
        .take(PREVIEW_CHAR_LIMIT)
        .collect();
    PersistenceError::store(format!("status {}: {}", status.as_u16(), preview.trim()))
}
