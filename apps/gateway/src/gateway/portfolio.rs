use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;

use super::{guarded, ProfileGateway};
use crate::errors::GatewayError;
use crate::models::{NewPortfolioLink, PortfolioLink};

/// Public page that renders a shared portfolio, keyed by `?slug=`.
pub const PORTFOLIO_PATH: &str = "/portfolio.html";

const SLUG_FALLBACK: &str = "user";
const SUFFIX_LEN: usize = 5;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// A shareable portfolio address.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareLink {
    pub url: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Lower-cases `name`, collapses every run of non-alphanumerics into one `-`
/// and trims hyphens from both ends. Empty results become `user`.
pub fn slug_base(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut gap = false;
    for ch in name.to_lowercase().chars() {
        if ch.is_ascii_alphanumeric() {
            if gap && !slug.is_empty() {
                slug.push('-');
            }
            gap = false;
            slug.push(ch);
        } else {
            gap = true;
        }
    }
    if slug.is_empty() {
        SLUG_FALLBACK.to_string()
    } else {
        slug
    }
}

fn random_suffix<R: Rng>(rng: &mut R) -> String {
    (0..SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}

impl ProfileGateway {
    fn share_url(&self, slug: &str) -> String {
        format!(
            "{}{}?slug={}",
            self.options.portfolio_origin.trim_end_matches('/'),
            PORTFOLIO_PATH,
            slug
        )
    }

    fn share_link(&self, link: PortfolioLink) -> ShareLink {
        ShareLink {
            url: self.share_url(&link.slug),
            slug: link.slug,
            created_at: Some(link.created_at),
        }
    }

    /// Mints a new link on every call; slugs are not checked for collisions.
    pub async fn create_portfolio_link(&self) -> Result<ShareLink, GatewayError> {
        guarded("create portfolio link", async {
            let session = self.session().await?;
            let profile = self.require_profile(&session).await?;
            let base = slug_base(profile.full_name.as_deref().unwrap_or_default());
            let slug = format!("{base}-{}", random_suffix(&mut rand::thread_rng()));

            let link: PortfolioLink = self
                .insert_record(profile.id, &NewPortfolioLink { slug })
                .await?;
            Ok(self.share_link(link))
        })
        .await
    }

    pub async fn list_portfolio_links(&self) -> Vec<ShareLink> {
        let links: Vec<PortfolioLink> = self.list_records().await;
        links.into_iter().map(|l| self.share_link(l)).collect()
    }
}
