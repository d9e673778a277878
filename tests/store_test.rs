// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Storage client public API integration tests.

use payments_service::{Client, Payment, PaymentAttributes, PaymentParty, Record, StoreError};
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

const EXAMPLE: &str = include_str!("fixtures/payment.json");

fn open_temp() -> (tempfile::TempDir, Client) {
    let dir = tempfile::tempdir().unwrap();
    let client = Client::open(dir.path().join("test.db")).unwrap();
    (dir, client)
}

fn example_payment(id: &str) -> Payment {
    let mut payment: Payment = serde_json::from_str(EXAMPLE).unwrap();
    payment.set_id(id.to_string());
    payment
}

fn make_payment(id: &str, account_name: &str) -> Payment {
    Payment::new(id).with_attributes(PaymentAttributes {
        amount: Some(dec!(42.10)),
        currency: "GBP".to_string(),
        beneficiary_party: Some(PaymentParty {
            account_name: account_name.to_string(),
            ..PaymentParty::default()
        }),
        ..PaymentAttributes::default()
    })
}

#[test]
fn fetch_all_on_empty_store() {
    let (_dir, client) = open_temp();
    let payments: Vec<Payment> = client.fetch_all().unwrap();
    assert!(payments.is_empty());
}

#[test]
fn fetch_one_missing_is_not_found() {
    let (_dir, client) = open_temp();
    let result = client.fetch_one::<Payment>("missing");
    assert!(matches!(result, Err(StoreError::NotFound)));
}

#[test]
fn create_then_fetch_round_trip() {
    let (_dir, client) = open_temp();
    let payment = example_payment("4ee3a8d8-ca7b-4290-a52c-dd5b6165ec43");
    client.create(&payment).unwrap();

    let fetched: Payment = client.fetch_one(payment.id()).unwrap();
    assert_eq!(fetched, payment);

    let fx = fetched.attributes.unwrap().fx.unwrap();
    assert_eq!(fx.exchange_rate.unwrap().to_string(), "2.00000");
    assert_eq!(fx.original_amount.unwrap().to_string(), "200.42");
}

#[test]
fn create_duplicate_fails_regardless_of_content() {
    let (_dir, client) = open_temp();
    client.create(&make_payment("p-1", "First")).unwrap();

    let result = client.create(&make_payment("p-1", "Second"));
    assert!(matches!(result, Err(StoreError::AlreadyExists)));

    // Original record untouched
    let stored: Payment = client.fetch_one("p-1").unwrap();
    let beneficiary = stored.attributes.unwrap().beneficiary_party.unwrap();
    assert_eq!(beneficiary.account_name, "First");
}

#[test]
fn fetch_all_returns_every_record() {
    let (_dir, client) = open_temp();
    client.create(&make_payment("b", "B")).unwrap();
    client.create(&make_payment("a", "A")).unwrap();
    client.create(&make_payment("c", "C")).unwrap();

    let mut ids: Vec<String> = client
        .fetch_all::<Payment>()
        .unwrap()
        .into_iter()
        .map(|p| p.resource.id)
        .collect();
    ids.sort();
    assert_eq!(ids, ["a", "b", "c"]);
}

#[test]
fn update_missing_is_not_found() {
    let (_dir, client) = open_temp();
    let result = client.update(&make_payment("ghost", "Nobody"));
    assert!(matches!(result, Err(StoreError::NotFound)));

    // Update never inserts
    assert!(matches!(client.fetch_one::<Payment>("ghost"), Err(StoreError::NotFound)));
}

#[test]
fn update_replaces_record() {
    let (_dir, client) = open_temp();
    client.create(&example_payment("p-1")).unwrap();

    let mut replacement = make_payment("p-1", "Replacement");
    replacement.resource.version = 7;
    client.update(&replacement).unwrap();

    let stored: Payment = client.fetch_one("p-1").unwrap();
    assert_eq!(stored, replacement);
    assert_eq!(stored.resource.version, 7);
    assert!(stored.attributes.unwrap().fx.is_none());
}

#[test]
fn delete_removes_record() {
    let (_dir, client) = open_temp();
    client.create(&make_payment("p-1", "A")).unwrap();

    client.delete::<Payment>("p-1").unwrap();
    assert!(matches!(client.fetch_one::<Payment>("p-1"), Err(StoreError::NotFound)));
    assert!(client.fetch_all::<Payment>().unwrap().is_empty());
}

#[test]
fn delete_missing_is_not_found() {
    let (_dir, client) = open_temp();
    let result = client.delete::<Payment>("missing");
    assert!(matches!(result, Err(StoreError::NotFound)));
}

#[test]
fn id_can_be_reused_after_delete() {
    let (_dir, client) = open_temp();
    client.create(&make_payment("p-1", "A")).unwrap();
    client.delete::<Payment>("p-1").unwrap();
    client.create(&make_payment("p-1", "B")).unwrap();

    let stored: Payment = client.fetch_one("p-1").unwrap();
    assert_eq!(stored.attributes.unwrap().beneficiary_party.unwrap().account_name, "B");
}

#[test]
fn records_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.db");

    {
        let client = Client::open(&path).unwrap();
        client.create(&example_payment("p-1")).unwrap();
        client.create(&example_payment("p-2")).unwrap();
        client.delete::<Payment>("p-2").unwrap();
    }

    let client = Client::open(&path).unwrap();
    let payments: Vec<Payment> = client.fetch_all().unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0], example_payment("p-1"));
}

#[test]
fn concurrent_creates_same_id_exactly_one_wins() {
    let (_dir, client) = open_temp();
    let client = Arc::new(client);
    let created = AtomicUsize::new(0);
    let rejected = AtomicUsize::new(0);

    std::thread::scope(|s| {
        for n in 0..16 {
            let client = Arc::clone(&client);
            let (created, rejected) = (&created, &rejected);
            s.spawn(move || match client.create(&make_payment("contested", &format!("writer-{n}"))) {
                Ok(()) => created.fetch_add(1, Ordering::SeqCst),
                Err(StoreError::AlreadyExists) => rejected.fetch_add(1, Ordering::SeqCst),
                Err(e) => panic!("unexpected error: {e}"),
            });
        }
    });

    assert_eq!(created.load(Ordering::SeqCst), 1);
    assert_eq!(rejected.load(Ordering::SeqCst), 15);
    assert_eq!(client.fetch_all::<Payment>().unwrap().len(), 1);
}
