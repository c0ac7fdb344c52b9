use proptest::prelude::*;

use ziladmin::admin::{NodeType, NodeTypeKind};
use ziladmin::rpc::error::SERVER_ERROR;
use ziladmin::rpc::RpcError;

proptest! {
    // The shard-node display form must parse back to the same shard id,
    // whatever the node reports.
    #[test]
    fn test_shard_node_display_roundtrips(shard in any::<u32>()) {
        let rendered = format!("Shard Node of shard {}", shard);
        let parsed: NodeType = rendered.parse().unwrap();
        prop_assert_eq!(parsed.kind, NodeTypeKind::ShardNode);
        prop_assert_eq!(parsed.shard_id, Some(shard));
        prop_assert_eq!(parsed.to_string(), rendered);
    }

    #[test]
    fn test_not_in_network_display_roundtrips(epoch in any::<u64>()) {
        let rendered = format!("Not in network, synced till epoch {}", epoch);
        let parsed: NodeType = rendered.parse().unwrap();
        prop_assert_eq!(parsed.kind, NodeTypeKind::NotInNetwork);
        prop_assert_eq!(parsed.till_epoch, Some(epoch));
        prop_assert_eq!(parsed.to_string(), rendered);
    }

    // Every code in the reserved range matches the sentinel, and nothing
    // just outside it does.
    #[test]
    fn test_server_error_range_matches_sentinel(code in -32099i64..=-32000) {
        let err = RpcError::new(code, "busy");
        prop_assert!(err.is_server_error());
        prop_assert!(err.matches(SERVER_ERROR));
    }

    #[test]
    fn test_codes_outside_server_range_do_not_match(offset in 1i64..1000) {
        prop_assert!(!RpcError::new(-32099 - offset, "").matches(SERVER_ERROR));
        prop_assert!(!RpcError::new(-32000 + offset, "").matches(SERVER_ERROR));
    }
}
