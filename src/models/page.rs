//! Page queries: users, groups, studies and ad-hoc HQL.

use crate::client::PhenoTipsClient;
use crate::error::Result;
use crate::models::{OBJECT_CLASS_GROUP, OBJECT_CLASS_STUDY, OBJECT_CLASS_USER};
use crate::naming::{unqualify, GROUPS_SPACE, STUDIES_SPACE, USERS_SPACE};
use crate::query::HqlQuery;
use crate::xml;

impl PhenoTipsClient {
    /// Run a query and return the IDs of the matching pages.
    pub async fn list_hql(&self, query: &HqlQuery) -> Result<Vec<String>> {
        self.list_hql_raw(&query.render()).await
    }

    /// Run a hand-written short-form HQL statement.
    ///
    /// The statement is sent as-is; values inside it must already be quoted
    /// and escaped. Prefer [`list_hql`](Self::list_hql).
    #[tracing::instrument(skip(self))]
    pub async fn list_hql_raw(&self, statement: &str) -> Result<Vec<String>> {
        let response = self
            .get_with_query(
                "rest/wikis/xwiki/query",
                &[("q", statement), ("type", "hql")],
            )
            .await?;
        let ids = xml::parse_search_ids(&response.text().await?)?;
        tracing::debug!(results = ids.len(), "query finished");
        Ok(ids)
    }

    /// Bare names of the pages in a space, optionally only those carrying an
    /// object of the given class.
    pub async fn list_pages(&self, space: &str, having_object: Option<&str>) -> Result<Vec<String>> {
        let pages = self
            .list_hql(&HqlQuery::pages_in_space(space, having_object))
            .await?;
        pages.iter().map(|page| unqualify(page, space)).collect()
    }

    pub async fn list_users(&self) -> Result<Vec<String>> {
        self.list_pages(USERS_SPACE, Some(OBJECT_CLASS_USER)).await
    }

    pub async fn list_groups(&self) -> Result<Vec<String>> {
        self.list_pages(GROUPS_SPACE, Some(OBJECT_CLASS_GROUP)).await
    }

    pub async fn list_studies(&self) -> Result<Vec<String>> {
        self.list_pages(STUDIES_SPACE, Some(OBJECT_CLASS_STUDY)).await
    }
}
