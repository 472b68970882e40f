//! The advertisement service contract, one [`Case`] per scenario.

use std::fmt::{self, Display};

use crate::ads::{Advertisement, CreatedAdvertisement, NewAdvertisement, StatisticsRecord};
use crate::testing::{AssertionTarget, CaseContext, CaseResult, Cleanup};

/// Id the service is never expected to know.
pub const NONEXISTENT_ID: &str = "nonexistent123";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Case {
    CreateAdvertisement,
    GetAdvertisementById,
    GetAdvertisementsBySeller,
    GetStatistics,
    DeleteAdvertisement,
    GetNonexistentAdvertisement,
    GetNonexistentStatistics,
    DeleteNonexistentAdvertisement,
    CreateAdvertisementWithoutName,
    FetchAfterDeleteReturns404,
}

impl Case {
    pub const ALL: [Case; 10] = [
        Case::CreateAdvertisement,
        Case::GetAdvertisementById,
        Case::GetAdvertisementsBySeller,
        Case::GetStatistics,
        Case::DeleteAdvertisement,
        Case::GetNonexistentAdvertisement,
        Case::GetNonexistentStatistics,
        Case::DeleteNonexistentAdvertisement,
        Case::CreateAdvertisementWithoutName,
        Case::FetchAfterDeleteReturns404,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Case::CreateAdvertisement => "create_advertisement",
            Case::GetAdvertisementById => "get_advertisement_by_id",
            Case::GetAdvertisementsBySeller => "get_advertisements_by_seller",
            Case::GetStatistics => "get_statistics",
            Case::DeleteAdvertisement => "delete_advertisement",
            Case::GetNonexistentAdvertisement => "get_nonexistent_advertisement",
            Case::GetNonexistentStatistics => "get_nonexistent_statistics",
            Case::DeleteNonexistentAdvertisement => "delete_nonexistent_advertisement",
            Case::CreateAdvertisementWithoutName => "create_advertisement_without_name",
            Case::FetchAfterDeleteReturns404 => "fetch_after_delete_returns_404",
        }
    }

    pub fn from_name(name: &str) -> Option<Case> {
        Case::ALL.into_iter().find(|case| case.name() == name)
    }

    /// Extended cases are only run on request.
    pub fn is_extended(self) -> bool {
        matches!(self, Case::FetchAfterDeleteReturns404)
    }

    pub fn selection(extended: bool) -> Vec<Case> {
        Case::ALL
            .into_iter()
            .filter(|case| extended || !case.is_extended())
            .collect()
    }

    pub async fn execute(self, ctx: &mut CaseContext<'_>) -> CaseResult {
        match self {
            Case::CreateAdvertisement => create_advertisement(ctx).await,
            Case::GetAdvertisementById => get_advertisement_by_id(ctx).await,
            Case::GetAdvertisementsBySeller => get_advertisements_by_seller(ctx).await,
            Case::GetStatistics => get_statistics(ctx).await,
            Case::DeleteAdvertisement => delete_advertisement(ctx).await,
            Case::GetNonexistentAdvertisement => get_nonexistent_advertisement(ctx).await,
            Case::GetNonexistentStatistics => get_nonexistent_statistics(ctx).await,
            Case::DeleteNonexistentAdvertisement => delete_nonexistent_advertisement(ctx).await,
            Case::CreateAdvertisementWithoutName => create_advertisement_without_name(ctx).await,
            Case::FetchAfterDeleteReturns404 => fetch_after_delete_returns_404(ctx).await,
        }
    }
}

impl Display for Case {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

pub fn simple_ad(seller_id: i64) -> NewAdvertisement {
    NewAdvertisement::new("Simple Test Ad", 500, seller_id)
}

pub fn fixture_ad(seller_id: i64) -> NewAdvertisement {
    NewAdvertisement::new("Test Ad from internship", 1000, seller_id)
}

/// Create an advertisement the case depends on and schedule its deletion.
pub async fn create_test_ad(ctx: &mut CaseContext<'_>) -> CaseResult<String> {
    let api = ctx.api();
    let response = api.create(&fixture_ad(ctx.seller_id())).await?;
    ctx.require_status(&response, 200)?;

    let created: CreatedAdvertisement = response.json("created advertisement")?;
    let id = ctx.require(
        AssertionTarget::field("id"),
        created.id().map(str::to_owned),
        "ID not found or not string in response",
    )?;
    ctx.register_cleanup(Cleanup::DeleteAdvertisement(id.clone()));

    Ok(id)
}

async fn create_advertisement(ctx: &mut CaseContext<'_>) -> CaseResult {
    let api = ctx.api();
    let response = api.create(&simple_ad(ctx.seller_id())).await?;
    ctx.require_status(&response, 200)?;

    let created: CreatedAdvertisement = response.json("created advertisement")?;
    if let Some(id) = created.id() {
        ctx.register_cleanup(Cleanup::DeleteAdvertisement(id.to_string()));
    }
    ctx.check_exists(AssertionTarget::field("id"), created.has_id());

    Ok(())
}

async fn get_advertisement_by_id(ctx: &mut CaseContext<'_>) -> CaseResult {
    let id = create_test_ad(ctx).await?;

    let response = ctx.api().get(&id).await?;
    ctx.require_status(&response, 200)?;

    let ads: Vec<Advertisement> = response.json("advertisement list")?;
    let first = ctx.require(AssertionTarget::field("[0]"), ads.first(), "No data returned")?;
    ctx.check_equals(AssertionTarget::field("[0].id"), id.as_str(), first.id.as_str());

    Ok(())
}

async fn get_advertisements_by_seller(ctx: &mut CaseContext<'_>) -> CaseResult {
    let id = create_test_ad(ctx).await?;

    let response = ctx.api().list_by_seller(ctx.seller_id()).await?;
    ctx.require_status(&response, 200)?;

    let ads: Vec<Advertisement> = response.json("advertisement list")?;
    let found = ads.iter().any(|ad| ad.id == id);
    ctx.check_contains(
        AssertionTarget::field("[*].id"),
        &id,
        found,
        "Created ad not found in seller's list",
    );

    Ok(())
}

async fn get_statistics(ctx: &mut CaseContext<'_>) -> CaseResult {
    let id = create_test_ad(ctx).await?;

    let response = ctx.api().statistics(&id).await?;
    ctx.require_status(&response, 200)?;

    let stats: Vec<StatisticsRecord> = response.json("statistics list")?;
    let stat = ctx.require(
        AssertionTarget::field("[0]"),
        stats.first(),
        "No statistics returned",
    )?;

    // A fresh advertisement was created with every counter at zero.
    for (field, value) in stat.fields() {
        let target = AssertionTarget::field(format!("[0].{field}"));
        if ctx.check_exists(target.clone(), value.is_some()) {
            ctx.check_equals(target, 0, value.unwrap_or_default());
        }
    }

    Ok(())
}

async fn delete_advertisement(ctx: &mut CaseContext<'_>) -> CaseResult {
    let id = create_test_ad(ctx).await?;

    let response = ctx.api().delete(&id).await?;
    ctx.check_status(&response, 200);

    Ok(())
}

async fn get_nonexistent_advertisement(ctx: &mut CaseContext<'_>) -> CaseResult {
    let response = ctx.api().get(NONEXISTENT_ID).await?;
    ctx.check_status(&response, 404);
    Ok(())
}

async fn get_nonexistent_statistics(ctx: &mut CaseContext<'_>) -> CaseResult {
    let response = ctx.api().statistics(NONEXISTENT_ID).await?;
    ctx.check_status(&response, 404);
    Ok(())
}

async fn delete_nonexistent_advertisement(ctx: &mut CaseContext<'_>) -> CaseResult {
    let response = ctx.api().delete(NONEXISTENT_ID).await?;
    ctx.check_status(&response, 404);
    Ok(())
}

async fn create_advertisement_without_name(ctx: &mut CaseContext<'_>) -> CaseResult {
    let payload = simple_ad(ctx.seller_id()).without_name();
    let response = ctx.api().create(&payload).await?;

    if !ctx.check_status(&response, 400) {
        // The service accepted it anyway; do not leave it behind.
        if let Ok(created) = response.json::<CreatedAdvertisement>("created advertisement") {
            if let Some(id) = created.id() {
                ctx.register_cleanup(Cleanup::DeleteAdvertisement(id.to_string()));
            }
        }
    }

    Ok(())
}

async fn fetch_after_delete_returns_404(ctx: &mut CaseContext<'_>) -> CaseResult {
    let id = create_test_ad(ctx).await?;

    let response = ctx.api().delete(&id).await?;
    ctx.require_status(&response, 200)?;

    let response = ctx.api().get(&id).await?;
    ctx.check_status(&response, 404);

    Ok(())
}
