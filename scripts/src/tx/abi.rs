//! Solidity bindings of the Lock contract

use alloy::sol;

sol! {
#[sol(rpc)]
interface ILock {
    event Withdrawal(uint256 amount, uint256 when);

    function unlockTime() external view returns (uint256);

    function owner() external view returns (address);

    function withdraw() external;
}

}
