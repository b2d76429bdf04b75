//! The back-office over HTTP.
//!
//! These tests require:
//! - A running `PostgreSQL` database with `DATABASE_URL` set
//! - The admin server running against it (`cargo run -p afrah-admin`)

use reqwest::header::LOCATION;
use reqwest::{Client, StatusCode};

use afrah_core::OrderStatus;
use afrah_integration_tests::{
    TEST_PASSWORD, admin_base_url, client, create_product, create_user, new_order, pool,
};
use afrah_store::models::{OrderLine, UserProfile};
use afrah_store::{AdminRepository, OrderRepository};

async fn login(client: &Client, user: &UserProfile) -> reqwest::Response {
    client
        .post(format!("{}/login", admin_base_url()))
        .form(&[("email", user.email.as_str()), ("password", TEST_PASSWORD)])
        .send()
        .await
        .expect("Failed to post login")
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_signed_out_redirects_to_login() {
    let resp = client()
        .get(format!("{}/orders", admin_base_url()))
        .send()
        .await
        .expect("Failed to get orders");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()[LOCATION], "/login");
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_customer_cannot_sign_in() {
    let pool = pool().await;
    let user = create_user(&pool, "Plain Customer").await;

    let resp = login(&client(), &user).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body = resp.text().await.expect("Failed to read body");
    assert!(body.contains("You do not have permission to access the admin panel."));
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_admin_updates_order_status() {
    let pool = pool().await;
    let admin = create_user(&pool, "Store Admin").await;
    AdminRepository::new(&pool)
        .set_admin(admin.id)
        .await
        .expect("grant admin");
    let product = create_product(&pool, 200, 5).await;
    let order = OrderRepository::new(&pool)
        .place(
            &new_order(None),
            &[OrderLine {
                product_id: product.id,
                quantity: 1,
            }],
        )
        .await
        .expect("Failed to place order");

    let client = client();
    let resp = login(&client, &admin).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()[LOCATION], "/");

    let resp = client
        .get(format!("{}/", admin_base_url()))
        .send()
        .await
        .expect("Failed to get dashboard");
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await.expect("body").contains("Login Successful!"));

    let resp = client
        .post(format!("{}/orders/{}/status", admin_base_url(), order.id))
        .header("hx-request", "true")
        .form(&[("status", "Shipped")])
        .send()
        .await
        .expect("Failed to update status");
    assert_eq!(resp.status(), StatusCode::OK);
    let trigger = resp.headers()["hx-trigger"].to_str().expect("ascii trigger");
    assert!(trigger.contains("Order status updated to Shipped."));

    let stored = OrderRepository::new(&pool)
        .get(order.id)
        .await
        .expect("load order")
        .expect("order exists");
    assert_eq!(stored.status, OrderStatus::Shipped);
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_revoked_admin_is_signed_out() {
    let pool = pool().await;
    let admin = create_user(&pool, "Temporary Admin").await;
    let admins = AdminRepository::new(&pool);
    admins.set_admin(admin.id).await.expect("grant admin");

    let client = client();
    assert_eq!(login(&client, &admin).await.status(), StatusCode::SEE_OTHER);

    let resp = client
        .get(format!("{}/products", admin_base_url()))
        .send()
        .await
        .expect("Failed to get products");
    assert_eq!(resp.status(), StatusCode::OK);

    admins.revoke_admin(admin.id).await.expect("revoke admin");

    let resp = client
        .get(format!("{}/products", admin_base_url()))
        .send()
        .await
        .expect("Failed to get products");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()[LOCATION], "/login");

    let resp = client
        .get(format!("{}/login", admin_base_url()))
        .send()
        .await
        .expect("Failed to get login");
    assert!(resp.text().await.expect("body").contains("Permission Denied"));
}
