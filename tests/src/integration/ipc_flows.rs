//! # IPC Flows
//!
//! The contract driven through `ContactBookEventHandler`, as a bus consumer
//! would drive it. Payloads go through a JSON round trip to mimic transport.

#[cfg(test)]
mod tests {
    use crate::sandbox::{amount, coins, random_address, random_addresses, Sandbox};
    use contact_book::codec;
    use contact_book::prelude::*;
    use std::sync::Arc;

    fn over_the_wire<T>(payload: &T) -> T
    where
        T: serde::Serialize + serde::de::DeserializeOwned,
    {
        let json = serde_json::to_string(payload).unwrap();
        serde_json::from_str(&json).unwrap()
    }

    #[tokio::test]
    async fn test_broadcast_over_ipc() {
        let sandbox = Sandbox::new();
        let owner = random_address();
        let contacts = random_addresses(5);
        let book = sandbox
            .deploy(
                InitParams::with_contacts(owner, contacts.clone(), 5),
                owner,
                amount("0.05"),
            )
            .await
            .unwrap();
        let handler = ContactBookEventHandler::new(Arc::new(book));

        let body = codec::encode(&ContractMessage::broadcast("Hello", coins(1))).unwrap();
        let request = DeliverMessageRequestPayload::new(owner, coins(6), body);
        let correlation_id = request.correlation_id;

        let response = handler
            .handle_deliver_message(over_the_wire(&request))
            .await;
        let response = over_the_wire(&response);

        assert!(response.success);
        assert_eq!(response.correlation_id, correlation_id);
        assert_eq!(response.kind, Some(MessageKind::Broadcast));
        assert_eq!(response.outgoing.len(), 5);
        assert_eq!(response.fees_paid, amount("0.05"));

        for contact in contacts {
            let stat = handler
                .handle_get_address_stat(GetAddressStatRequestPayload::new(contact))
                .await;
            assert_eq!(stat.stat, Some(1));
        }
    }

    #[tokio::test]
    async fn test_rejection_over_ipc() {
        let sandbox = Sandbox::new();
        let owner = random_address();
        let stranger = random_address();
        let book = sandbox
            .deploy(InitParams::new(owner, 5), owner, Coins::ZERO)
            .await
            .unwrap();
        let handler = ContactBookEventHandler::new(Arc::new(book));

        let body = codec::encode(&ContractMessage::add_contact(stranger)).unwrap();
        let response = handler
            .handle_deliver_message(DeliverMessageRequestPayload::new(
                stranger,
                Coins::ZERO,
                body,
            ))
            .await;

        assert!(!response.success);
        assert!(response.outgoing.is_empty());
        assert!(response.error.unwrap().starts_with("unauthorized"));

        let stat = handler
            .handle_get_address_stat(GetAddressStatRequestPayload::new(stranger))
            .await;
        assert_eq!(stat.stat, None);
        assert!(stat.error.is_none());
    }

    #[tokio::test]
    async fn test_metrics_record_contract_activity() {
        contact_telemetry::register_metrics().unwrap();
        let sandbox = Sandbox::new();
        let owner = random_address();
        let book = sandbox
            .deploy(InitParams::new(owner, 5), owner, coins(1))
            .await
            .unwrap();

        book.send(owner, Coins::ZERO, &ContractMessage::add_contact(random_address()))
            .await
            .unwrap();
        book.send(owner, Coins::ZERO, &ContractMessage::broadcast("m", Coins::ZERO))
            .await
            .unwrap();

        let text = contact_telemetry::encode_metrics().unwrap();
        assert!(text.contains("cb_contract_messages_total"));
        assert!(text.contains("kind=\"broadcast\""));
        assert!(text.contains("cb_contract_broadcast_fanout"));
    }
}
