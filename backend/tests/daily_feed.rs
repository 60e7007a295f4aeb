//! Feed rotation and paginated reads against embedded PostgreSQL.

use std::collections::BTreeSet;
use std::sync::Arc;

use eatwhatnow::domain::ports::{FeedQuery, FeedRepository};
use eatwhatnow::domain::{
    Coordinates, DailyFeed, FeedFilter, FeedRequest, FeedRotationJob, FeedService,
    ProximityFilter, Rating, RestaurantId, Schedule,
};
use eatwhatnow::outbound::persistence::{DieselFeedRepository, DieselRestaurantRepository};
use mockable::{Clock, DefaultClock};
use pagination::PageWindow;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rstest::{fixture, rstest};

mod support;

use support::{TestDatabase, provision_or_skip, today};

struct FeedContext {
    db: TestDatabase,
    job: FeedRotationJob<DieselRestaurantRepository, DieselFeedRepository>,
    feeds: Arc<DieselFeedRepository>,
}

#[fixture]
fn context() -> Option<FeedContext> {
    let db = provision_or_skip()?;
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let feeds = Arc::new(DieselFeedRepository::new(db.pool.clone()));
    let job = FeedRotationJob::new(
        Arc::new(DieselRestaurantRepository::new(db.pool.clone())),
        Arc::clone(&feeds),
        clock,
        Schedule::midnight(),
    );
    Some(FeedContext { db, job, feeds })
}

fn feed_rows(db: &TestDatabase) -> Vec<(String, i32, i32)> {
    db.client()
        .query(
            "SELECT feed_date::TEXT, position, restaurant_id FROM restaurants_daily_feed \
             ORDER BY feed_date, position",
            &[],
        )
        .expect("read feed rows")
        .iter()
        .map(|row| (row.get(0), row.get(1), row.get(2)))
        .collect()
}

fn unfiltered() -> FeedRequest {
    FeedRequest {
        filter: FeedFilter::default(),
        window: None,
    }
}

fn seed_five(db: &TestDatabase) -> Vec<i32> {
    (0..5)
        .map(|i| db.seed_restaurant(&format!("Place {i}"), 51.5 + f64::from(i) * 0.01, -0.12))
        .collect()
}

#[rstest]
fn rotation_writes_dense_positions(context: Option<FeedContext>) {
    let Some(ctx) = context else {
        return;
    };
    let ids = seed_five(&ctx.db);

    let feed = ctx
        .db
        .runtime
        .block_on(ctx.job.rotate())
        .expect("rotation succeeds");

    assert_eq!(feed.len(), 5);
    let rows = ctx
        .db
        .client()
        .query(
            "SELECT position, restaurant_id FROM restaurants_daily_feed ORDER BY position",
            &[],
        )
        .expect("read feed rows");
    let positions: Vec<i32> = rows.iter().map(|row| row.get(0)).collect();
    let restaurants: BTreeSet<i32> = rows.iter().map(|row| row.get(1)).collect();
    assert_eq!(positions, vec![1, 2, 3, 4, 5]);
    assert_eq!(restaurants, ids.into_iter().collect());
}

#[rstest]
fn rotating_twice_replaces_the_feed(context: Option<FeedContext>) {
    let Some(ctx) = context else {
        return;
    };
    seed_five(&ctx.db);

    ctx.db.runtime.block_on(ctx.job.rotate()).expect("first rotation");
    ctx.db.seed_restaurant("Late addition", 48.85, 2.35);
    ctx.db.runtime.block_on(ctx.job.rotate()).expect("second rotation");

    assert_eq!(
        ctx.db.count("SELECT COUNT(*) FROM restaurants_daily_feed"),
        6
    );
    assert_eq!(
        ctx.db
            .count("SELECT COUNT(DISTINCT position) FROM restaurants_daily_feed"),
        6
    );
}

#[rstest]
#[case(0, 2, 1)]
#[case(2, 2, 2)]
#[case(4, 1, 3)]
fn pages_follow_limit_and_offset(
    context: Option<FeedContext>,
    #[case] offset: u64,
    #[case] expected_items: usize,
    #[case] expected_page: u64,
) {
    let Some(ctx) = context else {
        return;
    };
    seed_five(&ctx.db);
    ctx.db.runtime.block_on(ctx.job.rotate()).expect("rotation");
    let service = FeedService::new(Arc::clone(&ctx.feeds), Arc::new(DefaultClock));
    let request = FeedRequest {
        filter: FeedFilter::default(),
        window: Some(PageWindow::new(2, offset).expect("window")),
    };

    let page = ctx
        .db
        .runtime
        .block_on(service.daily_feed(&request))
        .expect("feed page");

    assert_eq!(page.data.len(), expected_items);
    assert_eq!(page.meta.total, 5);
    assert_eq!(page.meta.total_pages, 3);
    assert_eq!(page.meta.page, expected_page);
    let positions: Vec<i32> = page.data.iter().map(|item| item.position).collect();
    let first = i32::try_from(offset).expect("small offset") + 1;
    assert_eq!(positions.first(), Some(&first));
}

#[rstest]
fn proximity_and_rating_filters_narrow_the_total(context: Option<FeedContext>) {
    let Some(ctx) = context else {
        return;
    };
    let near = ctx.db.seed_restaurant("Near", 51.5, -0.12);
    ctx.db.seed_restaurant("Far", 48.85, 2.35);
    let rated = ctx.db.seed_restaurant("Near and rated", 51.501, -0.121);
    ctx.db
        .client()
        .execute(
            "UPDATE restaurants SET rating = 4.6 WHERE id = $1",
            &[&rated],
        )
        .expect("rate restaurant");
    ctx.db.runtime.block_on(ctx.job.rotate()).expect("rotation");

    let proximity = FeedFilter {
        proximity: Some(ProximityFilter {
            origin: Coordinates::new(51.5, -0.12).expect("origin"),
            radius_km: 5.0,
        }),
        ..FeedFilter::default()
    };
    let nearby = ctx
        .db
        .runtime
        .block_on(ctx.feeds.page(
            today(),
            &FeedRequest {
                filter: proximity,
                window: None,
            },
        ))
        .expect("nearby page");
    let nearby_ids: BTreeSet<i32> = nearby
        .items
        .iter()
        .map(|item| item.restaurant.id.get())
        .collect();
    assert_eq!(nearby.total, 2);
    assert_eq!(nearby_ids, BTreeSet::from([near, rated]));

    let well_rated = FeedFilter {
        min_rating: Some(Rating::new(4.5).expect("rating")),
        ..proximity
    };
    let slice = ctx
        .db
        .runtime
        .block_on(ctx.feeds.page(
            today(),
            &FeedRequest {
                filter: well_rated,
                window: None,
            },
        ))
        .expect("rated page");
    assert_eq!(slice.total, 1);
    assert_eq!(slice.items[0].restaurant.id.get(), rated);
}

#[rstest]
fn deleting_a_restaurant_removes_its_feed_row(context: Option<FeedContext>) {
    let Some(ctx) = context else {
        return;
    };
    let ids = seed_five(&ctx.db);
    ctx.db.runtime.block_on(ctx.job.rotate()).expect("rotation");

    ctx.db
        .client()
        .execute("DELETE FROM restaurants WHERE id = $1", &[&ids[0]])
        .expect("delete restaurant");

    assert_eq!(
        ctx.db.count("SELECT COUNT(*) FROM restaurants_daily_feed"),
        4
    );
}

#[rstest]
fn yesterdays_feed_is_served_until_a_rotation_succeeds(context: Option<FeedContext>) {
    let Some(ctx) = context else {
        return;
    };
    let ids: Vec<RestaurantId> = seed_five(&ctx.db).into_iter().map(RestaurantId::new).collect();
    let yesterday = today().pred_opt().expect("yesterday");
    let stale = DailyFeed::shuffled(yesterday, ids, &mut SmallRng::seed_from_u64(11));
    ctx.db
        .runtime
        .block_on(ctx.feeds.replace_daily_feed(&stale))
        .expect("store yesterday's feed");

    let slice = ctx
        .db
        .runtime
        .block_on(ctx.feeds.page(today(), &unfiltered()))
        .expect("page");

    assert_eq!(slice.total, 5);
    let served: Vec<(i32, RestaurantId)> = slice
        .items
        .iter()
        .map(|item| (item.position, item.restaurant.id))
        .collect();
    let stored: Vec<(i32, RestaurantId)> = stale
        .entries()
        .iter()
        .map(|entry| (entry.position, entry.restaurant_id))
        .collect();
    assert_eq!(served, stored);
}

#[rstest]
fn failed_replacement_keeps_the_previous_feed(context: Option<FeedContext>) {
    let Some(ctx) = context else {
        return;
    };
    let mut ids: Vec<RestaurantId> = seed_five(&ctx.db).into_iter().map(RestaurantId::new).collect();
    ctx.db.runtime.block_on(ctx.job.rotate()).expect("rotation");
    let before = feed_rows(&ctx.db);
    let missing = ids.iter().map(|id| id.get()).max().unwrap_or(0) + 1000;
    ids.push(RestaurantId::new(missing));
    let broken = DailyFeed::shuffled(today(), ids, &mut SmallRng::seed_from_u64(3));

    let result = ctx.db.runtime.block_on(ctx.feeds.replace_daily_feed(&broken));

    assert!(result.is_err(), "feed rows must reference existing restaurants");
    assert_eq!(feed_rows(&ctx.db), before);
    assert_eq!(before.len(), 5);
}
