//! Store integration tests against a real Postgres
//!
//! Run with: DATABASE_URL=postgres://... cargo test -p tutorctl-server -- --ignored

use std::time::Duration;

use tutorctl_server::db::{schema, DbError, PgStore, Store};
use tutorctl_server::models::{
    College, CreateReceiptWithPayments, Funnel, InvoiceParams, LessonLocation, LessonSubject,
    Pagination, PaymentLineItem, PaymentMethod, PaymentParams, ReceiptParams, ReferenceName,
    StudentInput, StudentParams, UpdateReceiptWithPayments,
};
use tutorctl_server::testing::RandomGen;

async fn store() -> PgStore {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
    let pool = tutorctl_server::db::create_pool(&url)
        .await
        .expect("pool creation failed");
    schema::apply(&pool).await.expect("schema bootstrap failed");
    PgStore::new(pool)
}

fn page(limit: i64, offset: i64) -> Pagination {
    Pagination::raw(limit, offset)
}

async fn new_student(store: &PgStore, gen: &mut RandomGen) -> i64 {
    let params = StudentParams::try_from(gen.student_input()).unwrap();
    store.create_student(params).await.unwrap().student_id
}

/// Location, subject and payment method ids for lesson/receipt tests.
async fn lookups(store: &PgStore, gen: &mut RandomGen) -> (i64, i64, i64) {
    let location: LessonLocation = store
        .create_reference(gen.reference_name())
        .await
        .unwrap();
    let subject: LessonSubject = store
        .create_reference(gen.reference_name())
        .await
        .unwrap();
    let method: PaymentMethod = store
        .create_reference(gen.reference_name())
        .await
        .unwrap();
    (location.location_id, subject.subject_id, method.payment_method_id)
}

async fn count_where_notes(store: &PgStore, table: &str, notes: &str) -> i64 {
    let sql = format!("SELECT COUNT(*) FROM {table} WHERE notes = $1");
    sqlx::query_scalar(&sql)
        .bind(notes)
        .fetch_one(store.pool())
        .await
        .unwrap()
}

// ============================================================================
// References and students
// ============================================================================

#[tokio::test]
#[ignore = "requires database"]
async fn reference_lifecycle() {
    let store = store().await;
    let mut gen = RandomGen::from_entropy();

    let name = gen.reference_name();
    let created: College = store.create_reference(name.clone()).await.unwrap();
    assert_eq!(created.name, name.as_str());

    let fetched: College = store.get_reference(created.college_id).await.unwrap();
    assert_eq!(fetched, created);

    let renamed = gen.reference_name();
    store
        .update_reference::<College>(created.college_id, renamed.clone())
        .await
        .unwrap();
    let fetched: College = store.get_reference(created.college_id).await.unwrap();
    assert_eq!(fetched.name, renamed.as_str());

    store
        .delete_reference::<College>(created.college_id)
        .await
        .unwrap();
    let err = store
        .get_reference::<College>(created.college_id)
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    // delete is idempotent
    store
        .delete_reference::<College>(created.college_id)
        .await
        .unwrap();
}

#[tokio::test]
#[ignore = "requires database"]
async fn padded_reference_name_is_stored_unchanged() {
    let store = store().await;
    let name = ReferenceName::new("  Tel Aviv University ").unwrap();

    let created: College = store.create_reference(name).await.unwrap();
    let fetched: College = store.get_reference(created.college_id).await.unwrap();
    assert_eq!(fetched.name, "  Tel Aviv University ");
}

#[tokio::test]
#[ignore = "requires database"]
async fn student_delete_then_get_is_not_found() {
    let store = store().await;
    let mut gen = RandomGen::from_entropy();
    let id = new_student(&store, &mut gen).await;

    store.delete_student(id).await.unwrap();
    assert!(store.get_student(id).await.unwrap_err().is_not_found());
    store.delete_student(id).await.unwrap();
}

#[tokio::test]
#[ignore = "requires database"]
async fn update_of_missing_row_is_not_found() {
    let store = store().await;
    let mut gen = RandomGen::from_entropy();

    let err = store
        .update_reference::<Funnel>(i64::MAX, gen.reference_name())
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let params = StudentParams::try_from(gen.student_input()).unwrap();
    let err = store.update_student(i64::MAX, params).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
#[ignore = "requires database"]
async fn list_respects_limit() {
    let store = store().await;
    let mut gen = RandomGen::from_entropy();
    for _ in 0..6 {
        let _: Funnel = store.create_reference(gen.reference_name()).await.unwrap();
        new_student(&store, &mut gen).await;
    }

    let funnels: Vec<Funnel> = store.list_references(page(5, 0)).await.unwrap();
    assert_eq!(funnels.len(), 5);
    let sorted = funnels
        .windows(2)
        .all(|w| (&w[0].name, w[0].funnel_id) <= (&w[1].name, w[1].funnel_id));
    assert!(sorted, "funnels not ordered by name, id");

    let students = store.list_students(page(5, 0)).await.unwrap();
    assert_eq!(students.len(), 5);
}

#[tokio::test]
#[ignore = "requires database"]
async fn student_with_unknown_college_violates_constraint() {
    let store = store().await;
    let mut gen = RandomGen::from_entropy();
    let input = StudentInput {
        college_id: Some(i64::MAX),
        ..gen.student_input()
    };

    let err = store
        .create_student(StudentParams::try_from(input).unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::ConstraintViolation { .. }), "{err}");
}

#[tokio::test]
#[ignore = "requires database"]
async fn student_update_replaces_all_fields() {
    let store = store().await;
    let mut gen = RandomGen::from_entropy();
    let college: College = store.create_reference(gen.reference_name()).await.unwrap();

    let id = new_student(&store, &mut gen).await;
    let before = store.get_student(id).await.unwrap();

    let input = StudentInput {
        college_id: Some(college.college_id),
        email: None,
        ..gen.student_input()
    };
    store
        .update_student(id, StudentParams::try_from(input.clone()).unwrap())
        .await
        .unwrap();

    let after = store.get_student(id).await.unwrap();
    assert_eq!(after.first_name, input.first_name.unwrap());
    assert_eq!(after.college_id, Some(college.college_id));
    assert_eq!(after.email, None);
    assert_eq!(after.created_at, before.created_at);
}

// ============================================================================
// Transaction coordinator
// ============================================================================

#[tokio::test]
#[ignore = "requires database"]
async fn exec_tx_rolls_back_on_error() {
    let store = store().await;
    let name = RandomGen::from_entropy().reference_name();

    let inserted = name.clone();
    let result: Result<(), DbError> = store
        .exec_tx(move |mut q| {
            Box::pin(async move {
                let college = q.create_reference::<College>(&inserted).await?;
                Err(DbError::not_found("marker", college.college_id))
            })
        })
        .await;

    let id = match result {
        Err(DbError::NotFound { id, .. }) => id.parse::<i64>().unwrap(),
        other => panic!("unexpected result: {other:?}"),
    };
    assert!(store
        .get_reference::<College>(id)
        .await
        .unwrap_err()
        .is_not_found());
}

#[tokio::test]
#[ignore = "requires database"]
async fn dropped_transaction_is_not_committed() {
    let store = store().await;
    let name = RandomGen::from_entropy().reference_name();
    let (id_tx, id_rx) = tokio::sync::oneshot::channel();

    let inserted = name.clone();
    let work = store.exec_tx(move |mut q| {
        Box::pin(async move {
            let college = q.create_reference::<College>(&inserted).await?;
            let _ = id_tx.send(college.college_id);
            futures::future::pending::<()>().await;
            Ok(())
        })
    });
    let timed_out = tokio::time::timeout(Duration::from_millis(500), work).await;
    assert!(timed_out.is_err());

    let id = id_rx.await.unwrap();
    assert!(store
        .get_reference::<College>(id)
        .await
        .unwrap_err()
        .is_not_found());
}

// ============================================================================
// Lesson with invoices
// ============================================================================

#[tokio::test]
#[ignore = "requires database"]
async fn lesson_with_invoices_lifecycle() {
    let store = store().await;
    let mut gen = RandomGen::from_entropy();
    let (location_id, subject_id, _) = lookups(&store, &mut gen).await;
    let students = [
        new_student(&store, &mut gen).await,
        new_student(&store, &mut gen).await,
        new_student(&store, &mut gen).await,
    ];

    let input = gen.lesson_with_invoices(location_id, subject_id, &students);
    let created = store
        .create_lesson_with_invoices(input.clone())
        .await
        .unwrap();

    assert_eq!(created.lesson.duration, input.lesson.duration);
    assert_eq!(created.invoices.len(), 3);
    for (invoice, item) in created.invoices.iter().zip(&input.invoices) {
        assert_eq!(invoice.lesson_id, created.lesson.lesson_id);
        assert_eq!(invoice.student_id, item.student_id);
        assert_eq!(invoice.amount, item.amount);
    }

    let fetched = store
        .get_lesson_with_invoices(created.lesson.lesson_id)
        .await
        .unwrap();
    assert_eq!(fetched, created);

    store
        .delete_lesson_with_invoices(created.lesson.lesson_id)
        .await
        .unwrap();
    let err = store
        .get_lesson_with_invoices(created.lesson.lesson_id)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
#[ignore = "requires database"]
async fn lesson_with_invalid_student_rolls_back() {
    let store = store().await;
    let mut gen = RandomGen::from_entropy();
    let (location_id, subject_id, _) = lookups(&store, &mut gen).await;
    let valid = new_student(&store, &mut gen).await;

    let mut input = gen.lesson_with_invoices(location_id, subject_id, &[valid, i64::MAX]);
    let marker = gen.note();
    input.lesson.notes = Some(marker.clone());

    let err = store.create_lesson_with_invoices(input).await.unwrap_err();
    assert!(matches!(err, DbError::ConstraintViolation { .. }), "{err}");

    assert_eq!(count_where_notes(&store, "lessons", &marker).await, 0);
    let invoices = store
        .exec(move |mut q| {
            Box::pin(async move { q.list_invoices_by_student(valid, Pagination::raw(10, 0)).await })
        })
        .await
        .unwrap();
    assert!(invoices.is_empty());
}

// ============================================================================
// Receipt with payments
// ============================================================================

#[tokio::test]
#[ignore = "requires database"]
async fn receipt_amount_is_sum_of_payments() {
    let store = store().await;
    let mut gen = RandomGen::from_entropy();
    let (_, _, method) = lookups(&store, &mut gen).await;
    let student_id = new_student(&store, &mut gen).await;

    for n in 0..=4 {
        let input = gen.receipt_with_payments(student_id, method, n);
        let expected: f64 = input.payments.iter().map(|p| p.amount).sum();

        let created = store.create_receipt_with_payments(input).await.unwrap();
        assert_eq!(created.payments.len(), n);
        assert_eq!(created.receipt.amount, expected);

        let fetched = store
            .get_receipt_with_payments(created.receipt.receipt_id)
            .await
            .unwrap();
        assert_eq!(fetched.receipt.amount, expected);
        assert_eq!(fetched.payments_total(), expected);
    }
}

#[tokio::test]
#[ignore = "requires database"]
async fn receipt_with_two_payments() {
    let store = store().await;
    let mut gen = RandomGen::from_entropy();
    let first: PaymentMethod = store.create_reference(gen.reference_name()).await.unwrap();
    let second: PaymentMethod = store.create_reference(gen.reference_name()).await.unwrap();
    let student_id = new_student(&store, &mut gen).await;
    let when = gen.datetime();

    let created = store
        .create_receipt_with_payments(CreateReceiptWithPayments {
            student_id,
            receipt_datetime: when,
            notes: Some("n".into()),
            payments: vec![
                PaymentLineItem {
                    payment_datetime: when,
                    amount: 100.0,
                    payment_method_id: first.payment_method_id,
                },
                PaymentLineItem {
                    payment_datetime: when,
                    amount: 50.0,
                    payment_method_id: second.payment_method_id,
                },
            ],
        })
        .await
        .unwrap();

    assert_eq!(created.receipt.amount, 150.0);
    assert_eq!(created.payments.len(), 2);
    assert!(created
        .payments
        .iter()
        .all(|p| p.receipt_id == created.receipt.receipt_id));
}

#[tokio::test]
#[ignore = "requires database"]
async fn receipt_with_invalid_payment_method_rolls_back() {
    let store = store().await;
    let mut gen = RandomGen::from_entropy();
    let (_, _, method) = lookups(&store, &mut gen).await;
    let student_id = new_student(&store, &mut gen).await;

    let mut input = gen.receipt_with_payments(student_id, method, 2);
    input.payments.push(gen.payment_line_item(i64::MAX));
    let marker = gen.note();
    input.notes = Some(marker.clone());

    let err = store.create_receipt_with_payments(input).await.unwrap_err();
    assert!(matches!(err, DbError::ConstraintViolation { .. }), "{err}");
    assert_eq!(count_where_notes(&store, "receipts", &marker).await, 0);
}

#[tokio::test]
#[ignore = "requires database"]
async fn update_receipt_replaces_payment_set() {
    let store = store().await;
    let mut gen = RandomGen::from_entropy();
    let (_, _, method) = lookups(&store, &mut gen).await;
    let student_id = new_student(&store, &mut gen).await;

    let created = store
        .create_receipt_with_payments(gen.receipt_with_payments(student_id, method, 3))
        .await
        .unwrap();
    let receipt_id = created.receipt.receipt_id;

    let payments: Vec<PaymentLineItem> =
        (0..2).map(|_| gen.payment_line_item(method)).collect();
    let expected: f64 = payments.iter().map(|p| p.amount).sum();
    let updated = store
        .update_receipt_with_payments(UpdateReceiptWithPayments {
            receipt_id,
            student_id,
            receipt_datetime: gen.datetime(),
            notes: None,
            payments,
        })
        .await
        .unwrap();

    assert_eq!(updated.receipt.amount, expected);
    assert_eq!(updated.receipt.notes, None);
    assert_eq!(updated.payments.len(), 2);

    let fetched = store.get_receipt_with_payments(receipt_id).await.unwrap();
    assert_eq!(fetched, updated);

    let err = store
        .update_receipt_with_payments(UpdateReceiptWithPayments {
            receipt_id: i64::MAX,
            student_id,
            receipt_datetime: gen.datetime(),
            notes: None,
            payments: vec![],
        })
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
#[ignore = "requires database"]
async fn delete_receipt_removes_payments() {
    let store = store().await;
    let mut gen = RandomGen::from_entropy();
    let (_, _, method) = lookups(&store, &mut gen).await;
    let student_id = new_student(&store, &mut gen).await;

    let created = store
        .create_receipt_with_payments(gen.receipt_with_payments(student_id, method, 2))
        .await
        .unwrap();
    let receipt_id = created.receipt.receipt_id;

    store.delete_receipt_with_payments(receipt_id).await.unwrap();

    assert!(store
        .get_receipt_with_payments(receipt_id)
        .await
        .unwrap_err()
        .is_not_found());
    let remaining = store
        .exec(move |mut q| Box::pin(async move { q.list_payments_by_receipt(receipt_id).await }))
        .await
        .unwrap();
    assert!(remaining.is_empty());

    for payment in created.payments {
        let err = store
            .exec(move |mut q| Box::pin(async move { q.get_payment(payment.payment_id).await }))
            .await
            .unwrap_err();
        assert!(err.is_not_found(), "payment {} survived", payment.payment_id);
    }
}

#[tokio::test]
#[ignore = "requires database"]
async fn student_receipts_are_paged_with_payments() {
    let store = store().await;
    let mut gen = RandomGen::from_entropy();
    let (_, _, method) = lookups(&store, &mut gen).await;
    let student_id = new_student(&store, &mut gen).await;

    for n in 1..=3 {
        store
            .create_receipt_with_payments(gen.receipt_with_payments(student_id, method, n))
            .await
            .unwrap();
    }

    let first = store
        .list_receipts_with_payments_by_student(student_id, page(2, 0))
        .await
        .unwrap();
    assert_eq!(first.student_id, student_id);
    assert_eq!(first.receipts_with_payments.len(), 2);
    for entry in &first.receipts_with_payments {
        assert_eq!(entry.receipt.student_id, student_id);
        assert_eq!(entry.receipt.amount, entry.payments_total());
    }
    let ordered = first.receipts_with_payments.windows(2).all(|w| {
        (w[0].receipt.receipt_datetime, w[0].receipt.receipt_id)
            <= (w[1].receipt.receipt_datetime, w[1].receipt.receipt_id)
    });
    assert!(ordered);

    let rest = store
        .list_receipts_with_payments_by_student(student_id, page(2, 2))
        .await
        .unwrap();
    assert_eq!(rest.receipts_with_payments.len(), 1);

    let empty = store
        .list_receipts_with_payments_by_student(i64::MAX, page(5, 0))
        .await
        .unwrap();
    assert!(empty.receipts_with_payments.is_empty());
}

// ============================================================================
// Per-entity queries
// ============================================================================

#[tokio::test]
#[ignore = "requires database"]
async fn lesson_queries() {
    let store = store().await;
    let mut gen = RandomGen::from_entropy();
    let (location_id, subject_id, _) = lookups(&store, &mut gen).await;
    let params = gen.lesson_params(location_id, subject_id);
    let changed = gen.lesson_params(location_id, subject_id);

    store
        .exec(move |mut q| {
            Box::pin(async move {
                let created = q.create_lesson(&params).await?;
                assert_eq!(q.get_lesson(created.lesson_id).await?, created);

                q.update_lesson(created.lesson_id, &changed).await?;
                let fetched = q.get_lesson(created.lesson_id).await?;
                assert_eq!(fetched.duration, changed.duration);
                assert_eq!(fetched.notes, changed.notes);

                let err = q.update_lesson(i64::MAX, &changed).await.unwrap_err();
                assert!(err.is_not_found());

                let lessons = q.list_lessons(Pagination::raw(5, 0)).await?;
                assert!(!lessons.is_empty() && lessons.len() <= 5);
                assert!(lessons.windows(2).all(|w| {
                    (w[0].lesson_datetime, w[0].lesson_id) <= (w[1].lesson_datetime, w[1].lesson_id)
                }));

                q.delete_lesson(created.lesson_id).await?;
                assert!(q.get_lesson(created.lesson_id).await.unwrap_err().is_not_found());
                Ok(())
            })
        })
        .await
        .unwrap();
}

#[tokio::test]
#[ignore = "requires database"]
async fn invoice_queries() {
    let store = store().await;
    let mut gen = RandomGen::from_entropy();
    let (location_id, subject_id, _) = lookups(&store, &mut gen).await;
    let student_id = new_student(&store, &mut gen).await;
    let lesson = gen.lesson_params(location_id, subject_id);
    let hourly_fee = gen.hourly_fee();
    let discount = gen.discount();
    let when = gen.datetime();

    store
        .exec(move |mut q| {
            Box::pin(async move {
                let lesson = q.create_lesson(&lesson).await?;
                let mut params = InvoiceParams {
                    student_id,
                    lesson_id: lesson.lesson_id,
                    invoice_datetime: None,
                    hourly_fee,
                    duration: lesson.duration,
                    discount,
                    amount: hourly_fee,
                    notes: None,
                };

                let created = q.create_invoice(&params).await?;
                assert_eq!(q.get_invoice(created.invoice_id).await?, created);

                // omitting the datetime on update keeps the stored value
                params.amount = hourly_fee / 2.0;
                params.notes = Some("half price".into());
                q.update_invoice(created.invoice_id, &params).await?;
                let fetched = q.get_invoice(created.invoice_id).await?;
                assert_eq!(fetched.amount, hourly_fee / 2.0);
                assert_eq!(fetched.notes.as_deref(), Some("half price"));
                assert_eq!(fetched.invoice_datetime, created.invoice_datetime);

                params.invoice_datetime = Some(when);
                let err = q.update_invoice(i64::MAX, &params).await.unwrap_err();
                assert!(err.is_not_found());

                let invoices = q.list_invoices(Pagination::raw(5, 0)).await?;
                assert!(!invoices.is_empty() && invoices.len() <= 5);

                q.delete_invoice(created.invoice_id).await?;
                assert!(q.get_invoice(created.invoice_id).await.unwrap_err().is_not_found());

                let second = q.create_invoice(&params).await?;
                assert_eq!(q.delete_invoices_by_lesson(lesson.lesson_id).await?, 1);
                assert!(q.get_invoice(second.invoice_id).await.unwrap_err().is_not_found());
                Ok(())
            })
        })
        .await
        .unwrap();
}

#[tokio::test]
#[ignore = "requires database"]
async fn receipt_and_payment_queries() {
    let store = store().await;
    let mut gen = RandomGen::from_entropy();
    let (_, _, method) = lookups(&store, &mut gen).await;
    let student_id = new_student(&store, &mut gen).await;
    let receipt_params = ReceiptParams {
        student_id,
        receipt_datetime: gen.datetime(),
        amount: 0.0,
        notes: Some(gen.note()),
    };
    let item = gen.payment_line_item(method);
    let changed_amount = gen.payment_amount();

    store
        .exec(move |mut q| {
            Box::pin(async move {
                let receipt = q.create_receipt(&receipt_params).await?;
                assert_eq!(q.get_receipt(receipt.receipt_id).await?, receipt);

                let err = q
                    .update_receipt(i64::MAX, &receipt_params)
                    .await
                    .unwrap_err();
                assert!(err.is_not_found());

                let receipts = q.list_receipts(Pagination::raw(5, 0)).await?;
                assert!(!receipts.is_empty() && receipts.len() <= 5);

                let mut params = PaymentParams {
                    receipt_id: receipt.receipt_id,
                    payment_datetime: item.payment_datetime,
                    amount: item.amount,
                    payment_method_id: item.payment_method_id,
                };
                let payment = q.create_payment(&params).await?;
                assert_eq!(q.get_payment(payment.payment_id).await?, payment);

                params.amount = changed_amount;
                q.update_payment(payment.payment_id, &params).await?;
                assert_eq!(q.get_payment(payment.payment_id).await?.amount, changed_amount);

                let err = q.update_payment(i64::MAX, &params).await.unwrap_err();
                assert!(err.is_not_found());

                let payments = q.list_payments(Pagination::raw(5, 0)).await?;
                assert!(!payments.is_empty() && payments.len() <= 5);

                q.delete_payment(payment.payment_id).await?;
                assert!(q.get_payment(payment.payment_id).await.unwrap_err().is_not_found());

                q.delete_receipt(receipt.receipt_id).await?;
                assert!(q.get_receipt(receipt.receipt_id).await.unwrap_err().is_not_found());
                Ok(())
            })
        })
        .await
        .unwrap();
}
