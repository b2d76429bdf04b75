//! Ratings, wishlist, admin flags, contact messages and the change feed
//! against `PostgreSQL`.
//!
//! Run with: `DATABASE_URL=... cargo test -p afrah-integration-tests -- --ignored`

use std::time::Duration;

use afrah_core::{Stars, create_slug};
use afrah_integration_tests::{create_product, create_user, pool, reload, unique_email};
use afrah_store::live::{ChangeFeed, Collection, watch_collection};
use afrah_store::models::NewContactMessage;
use afrah_store::{
    AdminRepository, ContactRepository, ProductRepository, RatingRepository, RepositoryError,
    UserRepository, WishlistRepository,
};

fn stars(n: i32) -> Stars {
    Stars::new(n).expect("valid star count")
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_rerating_replaces_previous() {
    let pool = pool().await;
    let product = create_product(&pool, 500, 5).await;
    let alice = create_user(&pool, "Alice Rahman").await;
    let bob = create_user(&pool, "Bob Hasan").await;
    let ratings = RatingRepository::new(&pool);

    ratings.rate(product.id, alice.id, stars(5)).await.expect("rate");
    ratings.rate(product.id, bob.id, stars(3)).await.expect("rate");
    let aggregate = ratings.rate(product.id, alice.id, stars(4)).await.expect("re-rate");

    assert_eq!(aggregate.count, 2);
    assert_eq!(aggregate.total, 7);

    let stored = reload(&pool, &product).await;
    assert_eq!(stored.rating_count, 2);
    assert_eq!(stored.rating_total, 7);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_wishlist_toggle() {
    let pool = pool().await;
    let product = create_product(&pool, 120, 5).await;
    let user = create_user(&pool, "Wishful").await;
    let wishlist = WishlistRepository::new(&pool);

    assert!(wishlist.toggle(user.id, product.id).await.expect("toggle on"));
    assert_eq!(wishlist.product_ids(user.id).await.expect("ids"), vec![product.id]);
    assert!(!wishlist.toggle(user.id, product.id).await.expect("toggle off"));
    assert!(wishlist.products(user.id).await.expect("products").is_empty());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_duplicate_product_name_conflicts() {
    let pool = pool().await;
    let product = create_product(&pool, 120, 5).await;
    assert_eq!(product.slug, create_slug(&product.name));

    let products = ProductRepository::new(&pool);
    let err = products
        .create(&afrah_store::models::ProductInput {
            name: product.name.clone(),
            description: product.description.clone(),
            category: product.category.clone(),
            images: product.images.clone(),
            price: product.price,
            original_price: None,
            stock: 1,
            is_new: false,
        })
        .await
        .expect_err("slug is taken");
    assert!(matches!(err, RepositoryError::Conflict(_)));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_admin_flag_grant_and_revoke() {
    let pool = pool().await;
    let user = create_user(&pool, "Future Admin").await;
    let admins = AdminRepository::new(&pool);

    assert!(!admins.is_admin(user.id).await.expect("read flag"));
    admins.set_admin(user.id).await.expect("grant");
    admins.set_admin(user.id).await.expect("grant twice");
    assert!(admins.is_admin(user.id).await.expect("read flag"));

    let listed = UserRepository::new(&pool)
        .list_with_roles()
        .await
        .expect("list users");
    assert!(listed.iter().any(|u| u.profile.id == user.id && u.is_admin));

    admins.revoke_admin(user.id).await.expect("revoke");
    assert!(!admins.is_admin(user.id).await.expect("read flag"));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_contact_message_lifecycle() {
    let pool = pool().await;
    let contacts = ContactRepository::new(&pool);

    let saved = contacts
        .create(&NewContactMessage {
            name: "Sadia Islam".to_owned(),
            email: unique_email("contact"),
            phone: None,
            subject: "Bulk order".to_owned(),
            message: "Do you deliver to Sylhet?".to_owned(),
        })
        .await
        .expect("Failed to save message");

    let listed = contacts.list().await.expect("list");
    assert!(listed.iter().any(|m| m.id == saved.id));

    let deleted = contacts.delete(saved.id).await.expect("delete");
    assert_eq!(deleted.name, "Sadia Islam");
    assert!(matches!(
        contacts.delete(saved.id).await,
        Err(RepositoryError::NotFound)
    ));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_change_feed_reloads_subscription() {
    let pool = pool().await;
    let feed = ChangeFeed::listen(pool.clone());
    // Give the listener time to connect before writing.
    tokio::time::sleep(Duration::from_millis(500)).await;

    let loader_pool = pool.clone();
    let mut subscription = watch_collection(&feed, Collection::Products, move || {
        let pool = loader_pool.clone();
        async move { ProductRepository::new(&pool).list().await }
    });
    subscription
        .wait_for(|s| s.data.is_some())
        .await
        .expect("initial load");

    let product = create_product(&pool, 99, 1).await;

    let snapshot = tokio::time::timeout(
        Duration::from_secs(5),
        subscription.wait_for(|s| {
            s.data
                .as_ref()
                .is_some_and(|products| products.iter().any(|p| p.id == product.id))
        }),
    )
    .await
    .expect("change feed did not deliver the insert")
    .expect("subscription ended");
    assert!(snapshot.error.is_none());
}
