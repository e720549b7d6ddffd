//! # Vote-Extension Key Discovery
//!
//! Several replicas run extend, verify, prepare and process across heights
//! and must end up with identical validator bindings.

#[cfg(test)]
mod tests {
    use crate::fixtures::{init_tracing, TestNetwork};
    use secondary_keys::{
        AggregateEntry, BindingIdentity, InjectedAggregateTx, SecondaryKeyApi, SecondaryKeyConfig,
        SecondarySigningKey, VoteExtensionPayload,
    };
    use shared_types::{
        ExtendedCommitInfo, ExtendedVoteInfo, ProcessProposalRequest, ProposalStatus,
        VerifyStatus, VerifyVoteExtensionRequest,
    };

    const BLOCK_1: [u8; 32] = [0x01; 32];
    const BLOCK_2: [u8; 32] = [0x02; 32];

    fn all_accept(statuses: &[ProposalStatus]) -> bool {
        statuses.iter().all(|s| *s == ProposalStatus::Accept)
    }

    #[test]
    fn test_validators_learn_keys_on_first_use() {
        init_tracing();
        let network = TestNetwork::new(4, SecondaryKeyConfig::default());

        let commit = network.commit(1, BLOCK_1);
        assert_eq!(commit.votes.len(), 4);

        // Verification alone binds nothing.
        for v in &network.validators {
            assert!(v.node.store.is_empty());
        }

        let txs = network.propose(2, commit.clone());
        assert_eq!(txs.len(), 2);
        assert!(all_accept(&network.process(2, txs, commit)));

        for replica in &network.validators {
            for v in &network.validators {
                assert_eq!(
                    replica
                        .node
                        .service
                        .secondary_key(&BindingIdentity::Validator(v.address))
                        .unwrap(),
                    Some(v.key.public_key())
                );
            }
        }

        let snapshots: Vec<_> = network
            .validators
            .iter()
            .map(|v| v.node.store.snapshot())
            .collect();
        assert!(snapshots.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_other_key_rejected_after_binding() {
        init_tracing();
        let network = TestNetwork::new(3, SecondaryKeyConfig::default());
        let commit = network.commit(1, BLOCK_1);
        let txs = network.propose(2, commit.clone());
        assert!(all_accept(&network.process(2, txs, commit)));

        let target = &network.validators[1];
        let impostor = SecondarySigningKey::random();
        let forged = VoteExtensionPayload {
            signature: impostor.sign_prehash_recoverable(&BLOCK_2).unwrap().to_vec(),
        }
        .encode()
        .unwrap();

        let verifier = &network.validators[0].node.service;
        assert_eq!(
            verifier.verify_vote_extension(&VerifyVoteExtensionRequest {
                height: 2,
                hash: BLOCK_2,
                validator_address: target.address,
                vote_extension: forged.clone(),
            }),
            VerifyStatus::Reject
        );

        // A proposer smuggling the forged signature is rejected everywhere.
        let forged_commit = ExtendedCommitInfo {
            height: 2,
            block_hash: BLOCK_2,
            votes: vec![ExtendedVoteInfo {
                validator_address: target.address,
                vote_extension: forged,
            }],
        };
        let aggregate = InjectedAggregateTx {
            entries: vec![AggregateEntry {
                validator: target.address,
                signature: impostor.sign_prehash_recoverable(&BLOCK_2).unwrap().to_vec(),
            }],
        }
        .encode()
        .unwrap();

        let statuses = network.process(3, vec![aggregate], forged_commit);
        assert!(statuses.iter().all(|s| *s == ProposalStatus::Reject));
        assert_eq!(
            verifier
                .secondary_key(&BindingIdentity::Validator(target.address))
                .unwrap(),
            Some(target.key.public_key())
        );
    }

    #[test]
    fn test_empty_aggregate_rejected_by_every_replica() {
        let network = TestNetwork::new(3, SecondaryKeyConfig::default());
        let commit = network.commit(1, BLOCK_1);
        let empty = InjectedAggregateTx::default().encode().unwrap();

        let statuses = network.process(2, vec![empty, b"transfer".to_vec()], commit.clone());
        assert!(statuses.iter().all(|s| *s == ProposalStatus::Reject));

        let missing = network.process(2, vec![b"transfer".to_vec()], commit);
        assert!(missing.iter().all(|s| *s == ProposalStatus::Reject));

        for v in &network.validators {
            assert!(v.node.store.is_empty());
        }
    }

    #[test]
    fn test_second_height_verifies_against_bindings() {
        let network = TestNetwork::new(3, SecondaryKeyConfig::default());

        let first = network.commit(1, BLOCK_1);
        let txs = network.propose(2, first.clone());
        assert!(all_accept(&network.process(2, txs, first)));

        let second = network.commit(2, BLOCK_2);
        assert_eq!(second.votes.len(), 3);
        let txs = network.propose(3, second.clone());
        assert!(all_accept(&network.process(3, txs, second)));

        for v in &network.validators {
            assert_eq!(v.node.store.len(), 3);
        }
    }

    #[test]
    fn test_extensions_disabled_before_enable_height() {
        let network = TestNetwork::new(
            2,
            SecondaryKeyConfig {
                vote_extensions_enable_height: 5,
                ..Default::default()
            },
        );

        let commit = network.commit(3, BLOCK_1);
        assert_eq!(commit.extension_count(), 0);

        let txs = network.propose(4, commit.clone());
        assert_eq!(txs, vec![b"transfer".to_vec()]);
        assert!(all_accept(&network.process(4, txs, commit)));
    }

    #[test]
    fn test_replicas_agree_on_rejection() {
        let network = TestNetwork::new(4, SecondaryKeyConfig::default());
        let first = network.commit(1, BLOCK_1);
        let txs = network.propose(2, first.clone());
        assert!(all_accept(&network.process(2, txs, first)));

        let commit = network.commit(2, BLOCK_2);
        let mut txs = network.propose(3, commit.clone());

        let mut aggregate = InjectedAggregateTx::decode(&txs[0]).unwrap();
        aggregate.entries[2].signature[5] ^= 0x01;
        txs[0] = aggregate.encode().unwrap();

        let req = ProcessProposalRequest {
            height: 3,
            txs,
            proposed_last_commit: commit,
        };
        let statuses: Vec<_> = network
            .validators
            .iter()
            .map(|v| v.node.service.process_proposal(&req))
            .collect();

        assert!(statuses.iter().all(|s| *s == ProposalStatus::Reject));
        let snapshots: Vec<_> = network
            .validators
            .iter()
            .map(|v| v.node.store.snapshot())
            .collect();
        assert!(snapshots.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_commit_of_invalid_extensions_needs_no_aggregate() {
        init_tracing();
        let network = TestNetwork::new(3, SecondaryKeyConfig::default());
        let stranger = SecondarySigningKey::random();
        let commit = ExtendedCommitInfo {
            height: 1,
            block_hash: BLOCK_1,
            votes: vec![
                ExtendedVoteInfo {
                    validator_address: network.validators[0].address,
                    vote_extension: b"not an extension".to_vec(),
                },
                ExtendedVoteInfo {
                    validator_address: network.validators[1].address,
                    // another key, another block, no recovery byte
                    vote_extension: VoteExtensionPayload {
                        signature: stranger.sign_prehash_recoverable(&BLOCK_2).unwrap()[..64]
                            .to_vec(),
                    }
                    .encode()
                    .unwrap(),
                },
            ],
        };

        let txs = network.propose(2, commit.clone());
        assert_eq!(txs, vec![b"transfer".to_vec()]);
        assert!(all_accept(&network.process(2, txs, commit)));

        for v in &network.validators {
            assert!(v.node.store.is_empty());
        }
    }

    #[test]
    fn test_aggregate_must_repeat_commit_extensions() {
        init_tracing();
        let network = TestNetwork::new(3, SecondaryKeyConfig::default());
        let commit = network.commit(1, BLOCK_1);
        let mut txs = network.propose(2, commit.clone());

        // The proposer swaps in its own key for an unbound validator.
        let attacker = SecondarySigningKey::random();
        let mut aggregate = InjectedAggregateTx::decode(&txs[0]).unwrap();
        aggregate.entries[1].signature =
            attacker.sign_prehash_recoverable(&BLOCK_1).unwrap().to_vec();
        txs[0] = aggregate.encode().unwrap();

        let statuses = network.process(2, txs, commit.clone());
        assert!(statuses.iter().all(|s| *s == ProposalStatus::Reject));
        for v in &network.validators {
            assert!(v.node.store.is_empty());
        }

        // Dropping an entry is allowed, but it must still be a copy.
        let honest = InjectedAggregateTx::decode(&network.propose(2, commit.clone())[0]).unwrap();
        let partial = InjectedAggregateTx {
            entries: honest.entries[..1].to_vec(),
        }
        .encode()
        .unwrap();
        assert!(all_accept(&network.process(2, vec![partial], commit)));

        let target = network.validators[1].address;
        for v in &network.validators {
            assert_eq!(
                v.node
                    .service
                    .secondary_key(&BindingIdentity::Validator(target))
                    .unwrap(),
                None
            );
            assert_eq!(v.node.store.len(), 1);
        }
    }
}
