use proptest::prelude::*;

use rewards_ledger::{MemoryLedger, TokenLedger};
use rewards_types::{Address, TokenId};

proptest! {
    /// Transfers move value between accounts without changing the supply.
    #[test]
    fn transfers_conserve_supply(
        minted in 1u128..1_000_000_000,
        moves in proptest::collection::vec((0usize..3, 0usize..3, 0u128..1_000_000), 0..20),
    ) {
        let token = TokenId::new("RWD");
        let accounts = [Address::new("a"), Address::new("b"), Address::new("c")];
        let mut ledger = MemoryLedger::new();
        ledger.mint(&token, &accounts[0], minted).unwrap();

        for (from, to, amount) in moves {
            let before = ledger.balance_of(&token, &accounts[from]);
            let result = ledger.transfer(&token, &accounts[from], &accounts[to], amount);
            prop_assert_eq!(result.is_ok(), amount <= before);
        }

        let total: u128 = accounts.iter().map(|a| ledger.balance_of(&token, a)).sum();
        prop_assert_eq!(total, minted);
        prop_assert_eq!(ledger.total_supply(&token), minted);
    }

    /// A pull never takes more than the allowance, and a failed pull spends none of it.
    #[test]
    fn allowance_bounds_pulls(allowance in 0u128..1_000, pull in 0u128..2_000) {
        let token = TokenId::new("RWD");
        let (owner, spender) = (Address::new("owner"), Address::new("hook"));
        let mut ledger = MemoryLedger::new();
        ledger.mint(&token, &owner, 1_000).unwrap();
        ledger.approve(&token, &owner, &spender, allowance).unwrap();

        let result = ledger.transfer_from(&token, &spender, &owner, &spender, pull);
        if pull <= allowance {
            prop_assert!(result.is_ok());
            prop_assert_eq!(ledger.allowance(&token, &owner, &spender), allowance - pull);
            prop_assert_eq!(ledger.balance_of(&token, &spender), pull);
        } else {
            prop_assert!(result.is_err());
            prop_assert_eq!(ledger.allowance(&token, &owner, &spender), allowance);
            prop_assert_eq!(ledger.balance_of(&token, &spender), 0);
        }
    }
}
