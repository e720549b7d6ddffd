//! # Account Secondary-Factor Flow
//!
//! Registration followed by memo-signed transactions through a host-style
//! ante pipeline.

#[cfg(test)]
mod tests {
    use crate::fixtures::{ctx, init_tracing, signed_memo, transfer, Node};
    use secondary_keys::{
        AnteChain, AnteDecorator, AnteError, AuthTx, BindingIdentity, MsgRegisterSecondaryKey,
        RebindPolicy, SecondaryAuthOutcome, SecondaryKeyApi, SecondaryKeyConfig,
        SecondaryKeyError, SecondarySignature, SecondarySigningKey,
    };
    use shared_types::{Address, BlockContext};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const ALICE: Address = [0xA1; 20];

    /// Stands in for the host's sequence-increment stage.
    struct IncrementSequence(Arc<AtomicUsize>);

    impl AnteDecorator for IncrementSequence {
        fn name(&self) -> &'static str {
            "increment_sequence"
        }

        fn ante_handle(
            &self,
            ctx: BlockContext,
            _tx: &dyn AuthTx,
            _simulate: bool,
        ) -> Result<BlockContext, AnteError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(ctx)
        }
    }

    fn register(node: &Node, sender: Address, key: &SecondarySigningKey) -> secondary_keys::Result<()> {
        let envelope = SecondarySignature::sign_account(key)?.encode()?;
        node.service
            .register_secondary_key(&ctx(1), MsgRegisterSecondaryKey { sender, envelope })
            .map(|_| ())
    }

    #[test]
    fn test_register_then_authenticate_scenario() {
        init_tracing();
        let node = Node::new(SecondaryKeyConfig::default());
        let pk1 = SecondarySigningKey::random();
        let pk2 = SecondarySigningKey::random();

        // Unregistered: well-formed envelope still fails.
        let memo = signed_memo(&pk1, "SECONDARY");
        assert!(matches!(
            node.service.authenticate_tx(&ctx(2), &transfer(ALICE, memo.clone()), false),
            Err(SecondaryKeyError::UnknownBinding { .. })
        ));

        register(&node, ALICE, &pk1).unwrap();

        assert_eq!(
            node.service
                .authenticate_tx_outcome(&ctx(3), &transfer(ALICE, memo), false)
                .unwrap(),
            SecondaryAuthOutcome::Verified
        );

        let foreign = signed_memo(&pk2, "SECONDARY");
        assert!(matches!(
            node.service.authenticate_tx(&ctx(4), &transfer(ALICE, foreign), false),
            Err(SecondaryKeyError::InvalidSecondaryKey { .. })
        ));

        let unsigned = format!(
            "SECONDARY{{\"public_key\":\"{}\",\"signature\":\"\"}}",
            hex::encode(pk1.public_key())
        );
        assert!(matches!(
            node.service.authenticate_tx(&ctx(5), &transfer(ALICE, unsigned), false),
            Err(SecondaryKeyError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_pipeline_stops_before_sequence_increment() {
        init_tracing();
        let node = Node::new(SecondaryKeyConfig::default());
        let key = SecondarySigningKey::random();
        register(&node, ALICE, &key).unwrap();

        let increments = Arc::new(AtomicUsize::new(0));
        let chain = AnteChain::new()
            .with(node.service.ante_decorator())
            .with(IncrementSequence(Arc::clone(&increments)));

        let good = transfer(ALICE, signed_memo(&key, "SECONDARY"));
        let plain = transfer(ALICE, "lunch");
        let bad = transfer(ALICE, signed_memo(&SecondarySigningKey::random(), "SECONDARY"));

        assert_eq!(chain.run(ctx(2), &good, false).unwrap(), ctx(2));
        assert_eq!(chain.run(ctx(2), &plain, false).unwrap(), ctx(2));
        assert_eq!(
            chain.run(ctx(2), &bad, false).unwrap_err().code(),
            "INVALID_SECONDARY_PUBLIC_KEY"
        );
        assert_eq!(increments.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_custom_prefix() {
        let node = Node::new(SecondaryKeyConfig {
            memo_prefix: "2FA:".into(),
            ..Default::default()
        });
        let key = SecondarySigningKey::random();
        register(&node, ALICE, &key).unwrap();

        assert!(node
            .service
            .authenticate_tx(&ctx(2), &transfer(ALICE, signed_memo(&key, "2FA:")), false)
            .is_ok());

        // The default prefix is just a memo under a custom one.
        assert_eq!(
            node.service
                .authenticate_tx_outcome(
                    &ctx(2),
                    &transfer(ALICE, signed_memo(&key, "SECONDARY")),
                    false
                )
                .unwrap(),
            SecondaryAuthOutcome::NoPrefix
        );
    }

    #[test]
    fn test_rebinding_policies() {
        let first = SecondarySigningKey::random();
        let second = SecondarySigningKey::random();

        let strict = Node::new(SecondaryKeyConfig::default());
        register(&strict, ALICE, &first).unwrap();
        assert!(matches!(
            register(&strict, ALICE, &second),
            Err(SecondaryKeyError::BindingAlreadyExists { .. })
        ));

        let rotating = Node::new(SecondaryKeyConfig {
            account_rebind_policy: RebindPolicy::LastWriteWins,
            ..Default::default()
        });
        register(&rotating, ALICE, &first).unwrap();
        register(&rotating, ALICE, &second).unwrap();
        assert_eq!(
            rotating
                .service
                .secondary_key(&BindingIdentity::Account(ALICE))
                .unwrap(),
            Some(second.public_key())
        );
        assert!(matches!(
            rotating.service.authenticate_tx(
                &ctx(3),
                &transfer(ALICE, signed_memo(&first, "SECONDARY")),
                false
            ),
            Err(SecondaryKeyError::InvalidSecondaryKey { .. })
        ));
    }

    #[test]
    fn test_simulation_skips_checks() {
        let node = Node::new(SecondaryKeyConfig::default());
        let tx = transfer(ALICE, "SECONDARY{not an envelope");

        assert!(node.service.authenticate_tx(&ctx(7), &tx, true).is_ok());
        assert!(node.service.authenticate_tx(&ctx(7), &tx, false).is_err());
    }
}
