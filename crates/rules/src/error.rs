//! Consensus rule violations and engine errors.

/// One specific consensus-rule violation. Callers match on variant identity,
/// never on the rendered message.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConsensusError {
    BadMerkleRoot,
    BadTransactionDuplicate,
    BadTransactionMissingInput,
    BadTransactionNonFinal,
    BadTransactionPrematureCoinbaseSpending,
    BadTransactionPrematureCoinstakeSpending,
    BadTransactionInputValueOutOfRange,
    BadTransactionInBelowOut,
    BadTransactionNegativeFee,
    BadTransactionFeeOutOfRange,
    BadBlockSigOps,
    BadTransactionScriptError,
    BadCoinbaseAmount,
    BadCoinstakeAmount,
    UnequalStateRoots,
    UnequalCondensingTx,
    UnequalRefundAmounts,
    UserOpSpend,
    UserInternalCall,
}

impl std::fmt::Display for ConsensusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            ConsensusError::BadMerkleRoot => "merkle root mismatch",
            ConsensusError::BadTransactionDuplicate => "duplicate transaction",
            ConsensusError::BadTransactionMissingInput => "transaction missing input",
            ConsensusError::BadTransactionNonFinal => "transaction is not final",
            ConsensusError::BadTransactionPrematureCoinbaseSpending => {
                "premature spend of coinbase"
            }
            ConsensusError::BadTransactionPrematureCoinstakeSpending => {
                "premature spend of coinstake"
            }
            ConsensusError::BadTransactionInputValueOutOfRange => {
                "transaction input value out of range"
            }
            ConsensusError::BadTransactionInBelowOut => {
                "transaction input value below output value"
            }
            ConsensusError::BadTransactionNegativeFee => "transaction fee is negative",
            ConsensusError::BadTransactionFeeOutOfRange => "block fees out of range",
            ConsensusError::BadBlockSigOps => "block sigops limit exceeded",
            ConsensusError::BadTransactionScriptError => "script verification failed",
            ConsensusError::BadCoinbaseAmount => "coinbase pays too much",
            ConsensusError::BadCoinstakeAmount => "coinstake pays too much",
            ConsensusError::UnequalStateRoots => "contract state root mismatch",
            ConsensusError::UnequalCondensingTx => "condensing transaction mismatch",
            ConsensusError::UnequalRefundAmounts => "contract refund mismatch",
            ConsensusError::UserOpSpend => "user transaction spends contract output",
            ConsensusError::UserInternalCall => "user transaction creates internal call",
        };
        write!(f, "{message}")
    }
}

impl std::error::Error for ConsensusError {}

/// Outcome of one block validation attempt.
///
/// `Consensus` rejects the block; `Defect` signals a pipeline wiring error
/// (a bug in rule composition, not a property of the block).
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BlockValidationError {
    Consensus(ConsensusError),
    Defect(&'static str),
}

impl From<ConsensusError> for BlockValidationError {
    fn from(error: ConsensusError) -> Self {
        BlockValidationError::Consensus(error)
    }
}

impl std::fmt::Display for BlockValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlockValidationError::Consensus(error) => write!(f, "{error}"),
            BlockValidationError::Defect(message) => {
                write!(f, "consensus pipeline defect: {message}")
            }
        }
    }
}

impl std::error::Error for BlockValidationError {}
