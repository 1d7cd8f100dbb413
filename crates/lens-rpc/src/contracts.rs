//! Contract bindings for the lending market.

use alloy::sol;

sol! {
    /// Lending-market instrument (cToken).
    ///
    /// `exchangeRateCurrent`, `borrowBalanceCurrent` and `balanceOfUnderlying`
    /// accrue interest and are not `view`; they are run as `eth_call`
    /// simulations so nothing is written.
    #[sol(rpc)]
    #[derive(Debug)]
    interface ICToken {
        function exchangeRateCurrent() external returns (uint256);
        function comptroller() external view returns (address);
        function symbol() external view returns (string memory);
        function supplyRatePerBlock() external view returns (uint256);
        function borrowRatePerBlock() external view returns (uint256);
        function reserveFactorMantissa() external view returns (uint256);
        function totalBorrows() external view returns (uint256);
        function totalReserves() external view returns (uint256);
        function totalSupply() external view returns (uint256);
        function getCash() external view returns (uint256);
        function decimals() external view returns (uint8);
        function underlying() external view returns (address);
        function balanceOf(address owner) external view returns (uint256);
        function borrowBalanceCurrent(address account) external returns (uint256);
        function balanceOfUnderlying(address owner) external returns (uint256);
    }

    /// Market registry (comptroller).
    #[sol(rpc)]
    #[derive(Debug)]
    interface IComptroller {
        function markets(address cToken) external view returns (bool isListed, uint256 collateralFactorMantissa);
        function getAllMarkets() external view returns (address[] memory);
    }

    /// Underlying ERC-20 token.
    #[sol(rpc)]
    #[derive(Debug)]
    interface IEip20 {
        function decimals() external view returns (uint8);
        function balanceOf(address owner) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
    }
}
