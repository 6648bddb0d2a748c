//! # Contact Book Flows
//!
//! End-to-end scenarios on the sandbox ledger. Each test deploys a fresh
//! contract and drives it with encoded messages, then checks storage through
//! the getters and value movements through the ledger's transaction log.

#[cfg(test)]
mod tests {
    use crate::sandbox::{amount, coins, random_address, random_addresses, Sandbox};
    use contact_book::prelude::*;

    // =========================================================================
    // DEPLOYMENT
    // =========================================================================

    #[tokio::test]
    async fn test_deploy_with_initial_contacts() {
        let sandbox = Sandbox::new();
        let owner = random_address();
        let contacts = random_addresses(3);

        let book = sandbox
            .deploy(
                InitParams::with_contacts(owner, contacts.clone(), 10),
                owner,
                amount("0.05"),
            )
            .await
            .unwrap();

        assert_eq!(book.owner().await.unwrap(), owner);
        assert_eq!(book.capacity().await.unwrap(), 10);
        assert_eq!(book.balance().await.unwrap(), amount("0.05"));
        for contact in &contacts {
            assert_eq!(book.get_address_stat(*contact).await.unwrap(), Some(0));
        }
        assert!(sandbox.ledger.has_transaction(
            &TxFilter::any()
                .from(owner)
                .to(book.address())
                .success(true)
        ));
    }

    #[tokio::test]
    async fn test_address_is_derived_from_init() {
        let sandbox = Sandbox::new();
        let owner = random_address();
        let init = InitParams::new(owner, 5);

        let book = sandbox
            .deploy(init.clone(), owner, Coins::ZERO)
            .await
            .unwrap();
        assert_eq!(book.address(), compute_contract_address(&init).unwrap());

        let err = sandbox
            .deploy(init, owner, Coins::ZERO)
            .await
            .err()
            .unwrap();
        assert_eq!(err, ContractError::AlreadyDeployed(book.address()));
    }

    #[tokio::test]
    async fn test_two_books_on_one_chain_are_independent() {
        let sandbox = Sandbox::new();
        let owner = random_address();
        let friend = random_address();

        let small = sandbox
            .deploy(InitParams::new(owner, 1), owner, Coins::ZERO)
            .await
            .unwrap();
        let large = sandbox
            .deploy(InitParams::new(owner, 2), owner, Coins::ZERO)
            .await
            .unwrap();
        assert_ne!(small.address(), large.address());

        small
            .send(owner, Coins::ZERO, &ContractMessage::add_contact(friend))
            .await
            .unwrap();

        assert_eq!(small.get_address_stat(friend).await.unwrap(), Some(0));
        assert_eq!(large.get_address_stat(friend).await.unwrap(), None);
    }

    // =========================================================================
    // CONTACT MANAGEMENT
    // =========================================================================

    #[tokio::test]
    async fn test_add_and_remove_contact() {
        let sandbox = Sandbox::new();
        let owner = random_address();
        let user = random_address();
        let book = sandbox
            .deploy(InitParams::new(owner, 10), owner, amount("0.05"))
            .await
            .unwrap();

        assert_eq!(book.get_address_stat(user).await.unwrap(), None);

        book.send(owner, amount("0.05"), &ContractMessage::add_contact(user))
            .await
            .unwrap();
        assert_eq!(book.get_address_stat(user).await.unwrap(), Some(0));

        book.send(owner, amount("0.05"), &ContractMessage::remove_contact(user))
            .await
            .unwrap();
        assert_eq!(book.get_address_stat(user).await.unwrap(), None);
        assert!(book.contacts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stranger_cannot_manage_contacts() {
        let sandbox = Sandbox::new();
        let owner = random_address();
        let stranger = random_address();
        let friend = random_address();
        let book = sandbox
            .deploy(
                InitParams::with_contacts(owner, [friend], 10),
                owner,
                amount("0.05"),
            )
            .await
            .unwrap();
        let before = book.contacts().await.unwrap();

        let add = book
            .send(stranger, amount("0.05"), &ContractMessage::add_contact(stranger))
            .await
            .unwrap_err();
        let remove = book
            .send(stranger, amount("0.05"), &ContractMessage::remove_contact(friend))
            .await
            .unwrap_err();

        assert!(add.is_authorization_failure());
        assert!(remove.is_authorization_failure());
        assert_eq!(book.contacts().await.unwrap(), before);
        assert_eq!(
            sandbox
                .ledger
                .count_transactions(&TxFilter::any().from(stranger).success(false)),
            2
        );
        assert_eq!(book.stats().await.unauthorized_rejections, 2);
    }

    #[tokio::test]
    async fn test_capacity_is_enforced() {
        let sandbox = Sandbox::new();
        let owner = random_address();
        let initial = random_addresses(3);
        let newcomer = random_address();
        let book = sandbox
            .deploy(
                InitParams::with_contacts(owner, initial.clone(), 3),
                owner,
                Coins::ZERO,
            )
            .await
            .unwrap();

        let err = book
            .send(owner, Coins::ZERO, &ContractMessage::add_contact(newcomer))
            .await
            .unwrap_err();
        assert_eq!(err, ContractError::CapacityExceeded { capacity: 3 });

        // Re-adding an existing contact at capacity is fine.
        book.send(owner, Coins::ZERO, &ContractMessage::add_contact(initial[0]))
            .await
            .unwrap();

        // Freeing a slot lets the newcomer in.
        book.send(owner, Coins::ZERO, &ContractMessage::remove_contact(initial[1]))
            .await
            .unwrap();
        book.send(owner, Coins::ZERO, &ContractMessage::add_contact(newcomer))
            .await
            .unwrap();
        assert_eq!(book.get_address_stat(newcomer).await.unwrap(), Some(0));
        assert_eq!(book.contacts().await.unwrap().len(), 3);
    }

    // =========================================================================
    // BROADCAST
    // =========================================================================

    #[tokio::test]
    async fn test_broadcast_to_ten_contacts() {
        let sandbox = Sandbox::new();
        let owner = random_address();
        let contacts = random_addresses(10);
        let book = sandbox
            .deploy(
                InitParams::with_contacts(owner, contacts.clone(), 10),
                owner,
                amount("0.05"),
            )
            .await
            .unwrap();

        let receipt = book
            .send(owner, coins(11), &ContractMessage::broadcast("Hello", coins(1)))
            .await
            .unwrap();

        assert_eq!(receipt.kind, MessageKind::Broadcast);
        assert_eq!(receipt.message_count(), 10);
        assert_eq!(receipt.value_sent, coins(10));
        assert_eq!(receipt.fees_paid, amount("0.1"));

        let hello = Body::comment("Hello");
        for contact in &contacts {
            assert!(sandbox.delivered(book.address(), *contact, &hello));
            assert_eq!(sandbox.ledger.balance_of(contact), coins(1));
            assert_eq!(book.get_address_stat(*contact).await.unwrap(), Some(1));
        }
        // 0.05 + 11 in, 10 + 0.1 out
        assert_eq!(book.balance().await.unwrap(), amount("0.95"));
    }

    #[tokio::test]
    async fn test_underfunded_broadcast_changes_nothing() {
        let sandbox = Sandbox::new();
        let owner = random_address();
        let contacts = random_addresses(10);
        let book = sandbox
            .deploy(
                InitParams::with_contacts(owner, contacts.clone(), 10),
                owner,
                amount("0.05"),
            )
            .await
            .unwrap();

        let err = book
            .send(owner, coins(1), &ContractMessage::broadcast("Hello", coins(1)))
            .await
            .unwrap_err();

        assert!(matches!(err, ContractError::InsufficientBalance { .. }));
        for contact in &contacts {
            assert!(sandbox.ledger.transactions_to(contact).is_empty());
            assert_eq!(book.get_address_stat(*contact).await.unwrap(), Some(0));
        }
        assert_eq!(book.balance().await.unwrap(), amount("0.05"));
    }

    #[tokio::test]
    async fn test_repeated_broadcasts_accumulate_counters() {
        let sandbox = Sandbox::new();
        let owner = random_address();
        let contacts = random_addresses(4);
        let book = sandbox
            .deploy(
                InitParams::with_contacts(owner, contacts.clone(), 4),
                owner,
                coins(1),
            )
            .await
            .unwrap();

        for _ in 0..3 {
            book.send(owner, Coins::ZERO, &ContractMessage::broadcast("ping", Coins::ZERO))
                .await
                .unwrap();
        }

        for contact in &contacts {
            assert_eq!(book.get_address_stat(*contact).await.unwrap(), Some(3));
        }
        assert_eq!(book.stats().await.outgoing_messages, 12);
    }

    // =========================================================================
    // DIRECT SEND AND FORWARDING
    // =========================================================================

    #[tokio::test]
    async fn test_send_to_contact() {
        let sandbox = Sandbox::new();
        let owner = random_address();
        let contacts = random_addresses(2);
        let book = sandbox
            .deploy(
                InitParams::with_contacts(owner, contacts.clone(), 10),
                owner,
                amount("0.05"),
            )
            .await
            .unwrap();
        let body = Body::comment("its a test message");

        book.send(
            owner,
            amount("0.05"),
            &ContractMessage::send_to_contact(contacts[0], body.clone()),
        )
        .await
        .unwrap();

        assert!(sandbox.delivered(book.address(), contacts[0], &body));
        assert_eq!(book.get_address_stat(contacts[0]).await.unwrap(), Some(1));
        assert_eq!(book.get_address_stat(contacts[1]).await.unwrap(), Some(0));
    }

    #[tokio::test]
    async fn test_send_to_unknown_contact() {
        let sandbox = Sandbox::new();
        let owner = random_address();
        let outsider = random_address();
        let book = sandbox
            .deploy(InitParams::new(owner, 10), owner, amount("0.05"))
            .await
            .unwrap();

        let err = book
            .send(
                owner,
                amount("0.05"),
                &ContractMessage::send_to_contact(outsider, Body::comment("hi")),
            )
            .await
            .unwrap_err();

        assert_eq!(err, ContractError::UnknownContact(outsider));
        assert!(sandbox.ledger.transactions_to(&outsider).is_empty());
    }

    #[tokio::test]
    async fn test_contact_message_forwarded_to_owner() {
        let sandbox = Sandbox::new();
        let owner = random_address();
        let contact = random_address();
        let book = sandbox
            .deploy(
                InitParams::with_contacts(owner, [contact], 10),
                owner,
                amount("0.05"),
            )
            .await
            .unwrap();
        let body = Body::comment("hello owner");

        let receipt = book
            .handle_message(InboundMessage::new(contact, amount("0.05"), body.clone()))
            .await
            .unwrap();

        assert_eq!(receipt.kind, MessageKind::Plain);
        assert!(sandbox.delivered(book.address(), owner, &body));
        assert_eq!(book.get_address_stat(contact).await.unwrap(), Some(0));
    }

    #[tokio::test]
    async fn test_owner_plain_message_is_rejected() {
        let sandbox = Sandbox::new();
        let owner = random_address();
        let book = sandbox
            .deploy(InitParams::new(owner, 10), owner, amount("0.05"))
            .await
            .unwrap();

        let err = book
            .send(owner, amount("0.05"), &ContractMessage::comment("note to self"))
            .await
            .unwrap_err();

        assert_eq!(err, ContractError::NoRecipientSpecified);
        assert_eq!(
            sandbox
                .ledger
                .count_transactions(&TxFilter::any().from(book.address())),
            0
        );
    }

    #[tokio::test]
    async fn test_unknown_opcode_is_forwarded_verbatim() {
        let sandbox = Sandbox::new();
        let owner = random_address();
        let stranger = random_address();
        let book = sandbox
            .deploy(InitParams::new(owner, 10), owner, amount("0.05"))
            .await
            .unwrap();
        let body = Body::from_slice(&[0xde, 0xad, 0xbe, 0xef, 0x01]);

        book.handle_message(InboundMessage::new(stranger, amount("0.05"), body.clone()))
            .await
            .unwrap();

        assert!(sandbox.delivered(book.address(), owner, &body));
    }

    // =========================================================================
    // VALUE AND ATOMICITY
    // =========================================================================

    #[tokio::test]
    async fn test_top_up_from_anyone() {
        let sandbox = Sandbox::new();
        let owner = random_address();
        let donor = random_address();
        let book = sandbox
            .deploy(InitParams::new(owner, 10), owner, Coins::ZERO)
            .await
            .unwrap();

        let receipt = book
            .handle_message(InboundMessage::new(donor, coins(3), Body::new()))
            .await
            .unwrap();

        assert_eq!(receipt.kind, MessageKind::TopUp);
        assert!(receipt.outgoing.is_empty());
        assert_eq!(book.balance().await.unwrap(), coins(3));
    }

    #[tokio::test]
    async fn test_funded_sender_pays_from_own_balance() {
        let sandbox = Sandbox::new();
        let owner = random_address();
        let contact = random_address();
        let book = sandbox
            .deploy(
                InitParams::with_contacts(owner, [contact], 10),
                owner,
                coins(1),
            )
            .await
            .unwrap();
        sandbox.ledger.fund(owner, coins(2));

        book.send(
            owner,
            coins(1),
            &ContractMessage::send_to_contact(contact, Body::comment("pay")),
        )
        .await
        .unwrap();

        assert_eq!(sandbox.ledger.balance_of(&owner), coins(1));
        assert_eq!(sandbox.ledger.balance_of(&contact), coins(1));
    }

    #[tokio::test]
    async fn test_owner_broadcasts_after_receiving_forward() {
        let sandbox = Sandbox::new();
        let owner = random_address();
        let stranger = random_address();
        let contacts = random_addresses(10);
        let book = sandbox
            .deploy(
                InitParams::with_contacts(owner, contacts.clone(), 10),
                owner,
                amount("0.05"),
            )
            .await
            .unwrap();

        book.send(stranger, amount("0.05"), &ContractMessage::comment("hi"))
            .await
            .unwrap();
        assert_eq!(book.balance().await.unwrap(), amount("0.04"));
        assert_eq!(sandbox.ledger.balance_of(&owner), amount("0.05"));

        let receipt = book
            .send(owner, coins(11), &ContractMessage::broadcast("Hello", coins(1)))
            .await
            .unwrap();

        assert_eq!(receipt.message_count(), 10);
        assert_eq!(book.balance().await.unwrap(), amount("0.94"));
        for contact in &contacts {
            assert_eq!(book.get_address_stat(*contact).await.unwrap(), Some(1));
        }
    }

    #[tokio::test]
    async fn test_sender_shortfall_is_a_ledger_error() {
        let sandbox = Sandbox::new();
        let owner = random_address();
        let book = sandbox
            .deploy(InitParams::new(owner, 10), owner, coins(5))
            .await
            .unwrap();
        sandbox.ledger.fund(owner, coins(1));

        let err = book
            .send(owner, coins(2), &ContractMessage::TopUp)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ContractError::Ledger(LedgerError::InsufficientFunds { account, .. }) if account == owner
        ));
        assert_eq!(book.balance().await.unwrap(), coins(5));
        assert_eq!(sandbox.ledger.balance_of(&owner), coins(1));
    }

    #[tokio::test]
    async fn test_settlement_failure_rolls_back_counters() {
        let sandbox = Sandbox::new();
        let owner = random_address();
        let contacts = random_addresses(3);
        let book = sandbox
            .deploy(
                InitParams::with_contacts(owner, contacts.clone(), 3),
                owner,
                coins(5),
            )
            .await
            .unwrap();
        sandbox.ledger.freeze(book.address());

        let err = book
            .send(owner, Coins::ZERO, &ContractMessage::broadcast("Hello", coins(1)))
            .await
            .unwrap_err();

        assert!(matches!(err, ContractError::Ledger(LedgerError::Frozen(_))));
        for contact in &contacts {
            assert_eq!(book.get_address_stat(*contact).await.unwrap(), Some(0));
        }
        assert_eq!(book.balance().await.unwrap(), coins(5));

        sandbox.ledger.unfreeze(&book.address());
        book.send(owner, Coins::ZERO, &ContractMessage::broadcast("Hello", coins(1)))
            .await
            .unwrap();
        for contact in &contacts {
            assert_eq!(book.get_address_stat(*contact).await.unwrap(), Some(1));
        }
    }

    #[tokio::test]
    async fn test_custom_fee_schedule() {
        let sandbox = Sandbox::new();
        let owner = random_address();
        let contacts = random_addresses(2);
        let config = ServiceConfig {
            fees: FeeSchedule {
                per_message: amount("0.5"),
            },
            ..ServiceConfig::default()
        };
        let book = sandbox
            .deploy_with(
                InitParams::with_contacts(owner, contacts, 2),
                owner,
                coins(2),
                config,
            )
            .await
            .unwrap();

        // 2 × (1 + 0.5) = 3 > 2
        let err = book
            .send(owner, Coins::ZERO, &ContractMessage::broadcast("x", coins(1)))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ContractError::InsufficientBalance {
                required: coins(3),
                available: coins(2),
            }
        );

        let receipt = book
            .send(owner, coins(1), &ContractMessage::broadcast("x", coins(1)))
            .await
            .unwrap();
        assert_eq!(receipt.fees_paid, coins(1));
        assert_eq!(book.balance().await.unwrap(), Coins::ZERO);
    }
}
