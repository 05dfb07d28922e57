//! Order history, cancellation and status handling against the stub backend.
//!
//! Run with: cargo test -p gearhub-integration-tests --test orders

use gearhub_client::mirror::{MirrorError, OrderDetailScreen, OrderListScreen, OrderScope};
use gearhub_core::models::HasOrderStatus;
use gearhub_core::{OrderId, OrderStatus, StatusFilter};
use gearhub_integration_tests::StubBackend;

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn test_customer_sees_own_orders_newest_first() {
    let stub = StubBackend::spawn().await;
    let client = stub.signed_in("customer").await;
    let mut screen = OrderListScreen::new(OrderScope::Mine, 10);

    screen.refresh(&client).await.expect("orders");

    let page = screen.page().expect("loaded");
    let ids: Vec<i64> = page.items.iter().map(|o| o.order_id.as_i64()).collect();
    assert_eq!(ids, vec![104, 103, 102, 101]);
    assert!(page.first && page.last);
}

#[tokio::test]
async fn test_status_filter_is_sent_and_resets_page() {
    let stub = StubBackend::spawn().await;
    let client = stub.signed_in("customer").await;
    let mut screen = OrderListScreen::new(OrderScope::Mine, 2);
    screen.set_page(1);

    assert!(screen.set_filter_text("shipped").expect("known status"));
    assert_eq!(screen.page_index(), 0);
    screen.refresh(&client).await.expect("orders");

    let page = screen.page().expect("loaded");
    assert_eq!(page.total_elements, 1);
    assert_eq!(
        page.items.first().and_then(HasOrderStatus::status),
        Some(OrderStatus::Shipped)
    );
    let query = stub
        .state()
        .requests_to("/user/orders")
        .last()
        .and_then(|r| r.query.clone())
        .expect("query string");
    assert!(query.contains("page=0"), "{query}");
    assert!(query.contains("statusId=4"), "{query}");
}

#[tokio::test]
async fn test_unknown_status_text_is_rejected() {
    let mut screen = OrderListScreen::new(OrderScope::Mine, 10);
    let err = screen.set_filter_text("lost").expect_err("unknown status");
    assert!(matches!(err, MirrorError::InvalidInput(_)));
    assert_eq!(screen.filter(), StatusFilter::All);
}

// ============================================================================
// Cancellation
// ============================================================================

#[tokio::test]
async fn test_cancel_offered_only_for_pending_and_confirmed() {
    let stub = StubBackend::spawn().await;
    let client = stub.signed_in("customer").await;
    let mut screen = OrderListScreen::new(OrderScope::Mine, 10);
    screen.refresh(&client).await.expect("orders");

    assert!(screen.can_cancel(OrderId::new(101)));
    assert!(screen.can_cancel(OrderId::new(102)));
    assert!(!screen.can_cancel(OrderId::new(103)));
    assert!(!screen.can_cancel(OrderId::new(104)));

    let before = stub.request_count();
    let err = screen
        .cancel(&client, OrderId::new(103), "Changed my mind")
        .await
        .expect_err("shipped order");
    assert!(matches!(err, MirrorError::NotOffered(_)));
    assert_eq!(stub.request_count(), before);
}

#[tokio::test]
async fn test_cancel_marks_row_cancelled_after_confirmation() {
    let stub = StubBackend::spawn().await;
    let client = stub.signed_in("customer").await;
    let mut screen = OrderListScreen::new(OrderScope::Mine, 10);
    screen.refresh(&client).await.expect("orders");

    screen
        .cancel(&client, OrderId::new(102), "Ordered the wrong colour")
        .await
        .expect("cancel");

    let row = screen
        .page()
        .and_then(|p| p.items.iter().find(|o| o.order_id == OrderId::new(102)))
        .expect("row");
    assert_eq!(row.status(), Some(OrderStatus::Cancelled));
    assert!(!screen.can_cancel(OrderId::new(102)));
    assert_eq!(screen.mirror().message(), Some("Order cancelled"));
}

#[tokio::test]
async fn test_server_refusal_keeps_local_status() {
    let stub = StubBackend::spawn().await;
    let client = stub.signed_in("customer").await;
    let mut screen = OrderDetailScreen::new(OrderScope::Mine, OrderId::new(101));
    screen.refresh(&client).await.expect("order");
    assert!(screen.can_cancel());

    // Shipped on the server after the screen loaded.
    if let Some(order) = stub
        .state()
        .orders
        .iter_mut()
        .find(|o| o.order_id == OrderId::new(101))
    {
        order.set_status(OrderStatus::Shipped);
    }

    let err = screen
        .cancel(&client, "Too slow")
        .await
        .expect_err("server refuses");

    assert_eq!(err.message(), "Order cannot be cancelled");
    assert_eq!(
        screen.order().and_then(HasOrderStatus::status),
        Some(OrderStatus::Pending)
    );
    assert_eq!(screen.mirror().error(), Some("Order cannot be cancelled"));
}

#[tokio::test]
async fn test_blank_reason_is_refused_locally() {
    let stub = StubBackend::spawn().await;
    let client = stub.signed_in("customer").await;
    let mut screen = OrderDetailScreen::new(OrderScope::Mine, OrderId::new(101));
    screen.refresh(&client).await.expect("order");

    let err = screen.cancel(&client, "  ").await.expect_err("blank reason");

    assert!(matches!(err, MirrorError::Invalid(_)));
    assert!(stub.state().requests_to("/cancel").is_empty());
}

// ============================================================================
// Staff and admin
// ============================================================================

#[tokio::test]
async fn test_staff_never_offered_cancel_but_can_move_status() {
    let stub = StubBackend::spawn().await;
    let client = stub.signed_in("staff").await;
    let mut screen = OrderListScreen::new(OrderScope::Staff, 10);
    screen.refresh(&client).await.expect("orders");

    assert!(!screen.can_cancel(OrderId::new(101)));

    screen
        .update_status(&client, OrderId::new(101), OrderStatus::Confirmed)
        .await
        .expect("status");

    let row = screen
        .page()
        .and_then(|p| p.items.iter().find(|o| o.order_id == OrderId::new(101)))
        .expect("row");
    assert_eq!(row.status(), Some(OrderStatus::Confirmed));
    assert_eq!(stub.state().requests_to("/staff/order/101/status").len(), 1);
}

#[tokio::test]
async fn test_admin_detail_status_uses_admin_endpoint() {
    let stub = StubBackend::spawn().await;
    let client = stub.signed_in("admin").await;
    let mut screen = OrderDetailScreen::new(OrderScope::Admin, OrderId::new(103));
    screen.refresh(&client).await.expect("order");

    screen
        .update_status(&client, OrderStatus::Delivered)
        .await
        .expect("status");

    assert_eq!(
        screen.order().and_then(HasOrderStatus::status),
        Some(OrderStatus::Delivered)
    );
    assert_eq!(stub.state().requests_to("/admin/order/103/status").len(), 1);
}

#[tokio::test]
async fn test_customer_cannot_change_status() {
    let stub = StubBackend::spawn().await;
    let client = stub.signed_in("customer").await;
    let mut screen = OrderListScreen::new(OrderScope::Mine, 10);
    screen.refresh(&client).await.expect("orders");
    let before = stub.request_count();

    let err = screen
        .update_status(&client, OrderId::new(101), OrderStatus::Delivered)
        .await
        .expect_err("customer scope");

    assert!(matches!(err, MirrorError::NotOffered(_)));
    assert_eq!(stub.request_count(), before);
}
