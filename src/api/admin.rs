use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::client::{degrade, segment, ApiClient, RequestOptions};
use super::error::Result;
use crate::models::{de, AdminActivity, AdminStats, AdminUser, Role};

#[derive(Deserialize)]
struct StatsReply {
    #[serde(default)]
    stats: Option<AdminStats>,
}

#[derive(Deserialize)]
struct UserList {
    #[serde(default, deserialize_with = "de::null_default")]
    users: Vec<AdminUser>,
}

#[derive(Deserialize)]
struct ActivityList {
    #[serde(default, deserialize_with = "de::null_default")]
    activities: Vec<AdminActivity>,
}

#[derive(Serialize)]
struct RoleChange<'a> {
    role: &'a Role,
}

#[derive(Deserialize)]
struct Ack {}

impl ApiClient {
    pub async fn admin_stats(&self) -> Option<AdminStats> {
        let result = self
            .request_enveloped::<StatsReply>("/admin/stats", RequestOptions::get())
            .await
            .map(|r| r.stats);
        degrade("admin stats", result, None)
    }

    pub async fn admin_users(&self) -> Vec<AdminUser> {
        let result = self
            .request_enveloped::<UserList>("/admin/users", RequestOptions::get())
            .await
            .map(|l| l.users);
        degrade("admin user listing", result, Vec::new())
    }

    pub async fn update_user_role(&self, user_id: &str, role: &Role) -> Result<()> {
        let endpoint = format!("/admin/users/{}/role", segment(user_id));
        let options = RequestOptions::json(Method::PUT, &RoleChange { role })?;
        self.request_enveloped::<Ack>(&endpoint, options).await.map(|_| ())
    }

    pub async fn admin_activity(&self, limit: u32) -> Vec<AdminActivity> {
        let endpoint = format!("/admin/activity?limit={}", limit);
        let result = self
            .request_enveloped::<ActivityList>(&endpoint, RequestOptions::get())
            .await
            .map(|l| l.activities);
        degrade("admin activity", result, Vec::new())
    }
}
