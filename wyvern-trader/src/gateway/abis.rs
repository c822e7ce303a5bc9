//! Solidity bindings for the contracts the trader calls
#![allow(missing_docs, clippy::missing_docs_in_private_items)]

use alloy::sol;

sol! {
    #[sol(rpc)]
    interface IWyvernExchange {
        function nonces(address owner) external view returns (uint256);

        function validateOrderParameters_(
            address[7] addrs,
            uint256[9] uints,
            uint8 feeMethod,
            uint8 side,
            uint8 saleKind,
            uint8 howToCall,
            bytes orderCalldata,
            bytes replacementPattern,
            bytes staticExtradata
        ) external view returns (bool);

        function validateOrder_(
            address[7] addrs,
            uint256[9] uints,
            uint8 feeMethod,
            uint8 side,
            uint8 saleKind,
            uint8 howToCall,
            bytes orderCalldata,
            bytes replacementPattern,
            bytes staticExtradata,
            uint8 v,
            bytes32 r,
            bytes32 s
        ) external view returns (bool);

        function ordersCanMatch_(
            address[14] addrs,
            uint256[18] uints,
            uint8[8] feeMethodsSidesKindsHowToCalls,
            bytes calldataBuy,
            bytes calldataSell,
            bytes replacementPatternBuy,
            bytes replacementPatternSell,
            bytes staticExtradataBuy,
            bytes staticExtradataSell
        ) external view returns (bool);

        function orderCalldataCanMatch(
            bytes buyCalldata,
            bytes buyReplacementPattern,
            bytes sellCalldata,
            bytes sellReplacementPattern
        ) external pure returns (bool);

        function atomicMatch_(
            address[14] addrs,
            uint256[18] uints,
            uint8[8] feeMethodsSidesKindsHowToCalls,
            bytes calldataBuy,
            bytes calldataSell,
            bytes replacementPatternBuy,
            bytes replacementPatternSell,
            bytes staticExtradataBuy,
            bytes staticExtradataSell,
            uint8[2] vs,
            bytes32[5] rssMetadata
        ) external payable;
    }

    #[sol(rpc)]
    interface IProxyRegistry {
        function proxies(address owner) external view returns (address);
        function registerProxy() external returns (address);
    }

    #[sol(rpc)]
    interface IERC20 {
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
        function balanceOf(address account) external view returns (uint256);
    }

    #[sol(rpc)]
    interface IERC721 {
        function isApprovedForAll(address owner, address operator) external view returns (bool);
        function setApprovalForAll(address operator, bool approved) external;
        function ownerOf(uint256 tokenId) external view returns (address);
    }

    #[sol(rpc)]
    interface IERC1155 {
        function balanceOf(address account, uint256 id) external view returns (uint256);
    }

    #[sol(rpc)]
    interface IMulticall3 {
        struct Call3Value {
            address target;
            bool allowFailure;
            uint256 value;
            bytes callData;
        }

        struct Result {
            bool success;
            bytes returnData;
        }

        function aggregate3Value(Call3Value[] calls) external payable returns (Result[] returnData);
    }
}
