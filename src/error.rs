// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

//! The closed error taxonomy of the interpreter.
//!
//! Every error identifies a single parser, semantic, or geometric violation
//! and carries a stable short English phrase for display.  Non-error
//! outcomes of `read`/`execute` are the [`Status`] sentinels, not errors.

use thiserror::Error;

/// Shorthand for interpreter results.
pub type Result<T> = std::result::Result<T, Error>;

/// Non-error outcomes of reading or executing a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The operation completed normally.
    Ok,
    /// The caller must let the downstream queue drain before continuing:
    /// either a block-delete line was read, or a probe was just executed.
    ExecuteFinish,
    /// M2 or M30 was executed; the program is over.
    Exit,
    /// The closing percent line was reached.
    EndFile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("A file is already open")]
    FileAlreadyOpen,
    #[error("All axes missing with g92")]
    AllAxesMissingWithG92,
    #[error("All axes missing with motion code")]
    AllAxesMissingWithMotionCode,
    #[error("Arc radius too small to reach end point")]
    ArcRadiusTooSmallToReachEndPoint,
    #[error("Argument to acos out of range")]
    ArgumentToAcosOutOfRange,
    #[error("Argument to asin out of range")]
    ArgumentToAsinOutOfRange,
    #[error("Attempt to divide by zero")]
    AttemptToDivideByZero,
    #[error("Attempt to raise negative to non integer power")]
    AttemptToRaiseNegativeToNonIntegerPower,
    #[error("Bad character used")]
    BadCharacterUsed,
    #[error("Bad format unsigned integer")]
    BadFormatUnsignedInteger,
    #[error("Bad number format")]
    BadNumberFormat,
    #[error("Cannot change axis offsets with cutter radius comp")]
    CannotChangeAxisOffsetsWithCutterRadiusComp,
    #[error("Cannot change units with cutter radius comp")]
    CannotChangeUnitsWithCutterRadiusComp,
    #[error("Cannot create backup file")]
    CannotCreateBackupFile,
    #[error("Cannot do g1 with zero feed rate")]
    CannotDoG1WithZeroFeedRate,
    #[error("Cannot do zero repeats of cycle")]
    CannotDoZeroRepeatsOfCycle,
    #[error("Cannot make arc with zero feed rate")]
    CannotMakeArcWithZeroFeedRate,
    #[error("Cannot move rotary axes during probing")]
    CannotMoveRotaryAxesDuringProbing,
    #[error("Cannot open backup file")]
    CannotOpenBackupFile,
    #[error("Cannot open variable file")]
    CannotOpenVariableFile,
    #[error("Cannot probe in inverse time feed mode")]
    CannotProbeInInverseTimeFeedMode,
    #[error("Cannot probe with cutter radius comp on")]
    CannotProbeWithCutterRadiusCompOn,
    #[error("Cannot probe with zero feed rate")]
    CannotProbeWithZeroFeedRate,
    #[error("Cannot put a b in canned cycle")]
    CannotPutABInCannedCycle,
    #[error("Cannot put a c in canned cycle")]
    CannotPutACInCannedCycle,
    #[error("Cannot put an a in canned cycle")]
    CannotPutAnAInCannedCycle,
    #[error("Cannot turn cutter radius comp on out of xy plane")]
    CannotTurnCutterRadiusCompOnOutOfXyPlane,
    #[error("Cannot turn cutter radius comp on when on")]
    CannotTurnCutterRadiusCompOnWhenOn,
    #[error("Cannot use axis values with g80")]
    CannotUseAxisValuesWithG80,
    #[error("Cannot use axis values without a g code that uses them")]
    CannotUseAxisValuesWithoutAGCodeThatUsesThem,
    #[error("Cannot use g28 or g30 with cutter radius comp")]
    CannotUseG28OrG30WithCutterRadiusComp,
    #[error("Cannot use g53 incremental")]
    CannotUseG53Incremental,
    #[error("Cannot use g53 with cutter radius comp")]
    CannotUseG53WithCutterRadiusComp,
    #[error("Cannot use two g codes that both use axis values")]
    CannotUseTwoGCodesThatBothUseAxisValues,
    #[error("Cannot use xz plane with cutter radius comp")]
    CannotUseXzPlaneWithCutterRadiusComp,
    #[error("Cannot use yz plane with cutter radius comp")]
    CannotUseYzPlaneWithCutterRadiusComp,
    #[error("Concave corner with cutter radius comp")]
    ConcaveCornerWithCutterRadiusComp,
    #[error("Coordinate system index parameter 5220 out of range")]
    CoordinateSystemIndexParameter5220OutOfRange,
    #[error("Current point same as end point of arc")]
    CurrentPointSameAsEndPointOfArc,
    #[error("Cutter gouging with cutter radius comp")]
    CutterGougingWithCutterRadiusComp,
    #[error("D word with no g41 or g42")]
    DWordWithNoG41OrG42,
    #[error("Dwell time missing with g4")]
    DwellTimeMissingWithG4,
    #[error("Dwell time p word missing with g82")]
    DwellTimePWordMissingWithG82,
    #[error("Dwell time p word missing with g86")]
    DwellTimePWordMissingWithG86,
    #[error("Dwell time p word missing with g88")]
    DwellTimePWordMissingWithG88,
    #[error("Dwell time p word missing with g89")]
    DwellTimePWordMissingWithG89,
    #[error("Equal sign missing in parameter setting")]
    EqualSignMissingInParameterSetting,
    #[error("F word missing with inverse time arc move")]
    FWordMissingWithInverseTimeArcMove,
    #[error("F word missing with inverse time g1 move")]
    FWordMissingWithInverseTimeG1Move,
    #[error("File ended with no percent sign")]
    FileEndedWithNoPercentSign,
    #[error("File ended with no percent sign or program end")]
    FileEndedWithNoPercentSignOrProgramEnd,
    #[error("File not open")]
    FileNotOpen,
    #[error("G code out of range")]
    GCodeOutOfRange,
    #[error("H word with no g43")]
    HWordWithNoG43,
    #[error("I word given for arc in yz plane")]
    IWordGivenForArcInYzPlane,
    #[error("I word missing with g87")]
    IWordMissingWithG87,
    #[error("I word with no g2 or g3 or g87 to use it")]
    IWordWithNoG2OrG3OrG87ToUseIt,
    #[error("J word given for arc in xz plane")]
    JWordGivenForArcInXzPlane,
    #[error("J word missing with g87")]
    JWordMissingWithG87,
    #[error("J word with no g2 or g3 or g87 to use it")]
    JWordWithNoG2OrG3OrG87ToUseIt,
    #[error("K word given for arc in xy plane")]
    KWordGivenForArcInXyPlane,
    #[error("K word missing with g87")]
    KWordMissingWithG87,
    #[error("K word with no g2 or g3 or g87 to use it")]
    KWordWithNoG2OrG3OrG87ToUseIt,
    #[error("L word with no canned cycle or g10")]
    LWordWithNoCannedCycleOrG10,
    #[error("Line number greater than 99999")]
    LineNumberGreaterThan99999,
    #[error("Line with g10 does not have l2")]
    LineWithG10DoesNotHaveL2,
    #[error("M code greater than 99")]
    MCodeGreaterThan99,
    #[error("Mixed radius ijk format for arc")]
    MixedRadiusIjkFormatForArc,
    #[error("Multiple a words on one line")]
    MultipleAWordsOnOneLine,
    #[error("Multiple b words on one line")]
    MultipleBWordsOnOneLine,
    #[error("Multiple c words on one line")]
    MultipleCWordsOnOneLine,
    #[error("Multiple d words on one line")]
    MultipleDWordsOnOneLine,
    #[error("Multiple f words on one line")]
    MultipleFWordsOnOneLine,
    #[error("Multiple h words on one line")]
    MultipleHWordsOnOneLine,
    #[error("Multiple i words on one line")]
    MultipleIWordsOnOneLine,
    #[error("Multiple j words on one line")]
    MultipleJWordsOnOneLine,
    #[error("Multiple k words on one line")]
    MultipleKWordsOnOneLine,
    #[error("Multiple l words on one line")]
    MultipleLWordsOnOneLine,
    #[error("Multiple p words on one line")]
    MultiplePWordsOnOneLine,
    #[error("Multiple q words on one line")]
    MultipleQWordsOnOneLine,
    #[error("Multiple r words on one line")]
    MultipleRWordsOnOneLine,
    #[error("Multiple s words on one line")]
    MultipleSWordsOnOneLine,
    #[error("Multiple t words on one line")]
    MultipleTWordsOnOneLine,
    #[error("Multiple x words on one line")]
    MultipleXWordsOnOneLine,
    #[error("Multiple y words on one line")]
    MultipleYWordsOnOneLine,
    #[error("Multiple z words on one line")]
    MultipleZWordsOnOneLine,
    #[error("Must use g0 or g1 with g53")]
    MustUseG0OrG1WithG53,
    #[error("Negative argument to sqrt")]
    NegativeArgumentToSqrt,
    #[error("Negative d word tool radius index used")]
    NegativeDWordToolRadiusIndexUsed,
    #[error("Negative f word used")]
    NegativeFWordUsed,
    #[error("Negative g code used")]
    NegativeGCodeUsed,
    #[error("Negative h word tool length offset index used")]
    NegativeHWordToolLengthOffsetIndexUsed,
    #[error("Negative l word used")]
    NegativeLWordUsed,
    #[error("Negative m code used")]
    NegativeMCodeUsed,
    #[error("Negative or zero q value used")]
    NegativeOrZeroQValueUsed,
    #[error("Negative p word used")]
    NegativePWordUsed,
    #[error("Negative spindle speed used")]
    NegativeSpindleSpeedUsed,
    #[error("Negative tool id used")]
    NegativeToolIdUsed,
    #[error("Nested comment found")]
    NestedCommentFound,
    #[error("Non integer value for integer")]
    NonIntegerValueForInteger,
    #[error("Offset index missing")]
    OffsetIndexMissing,
    #[error("P value not an integer with g10 l2")]
    PValueNotAnIntegerWithG10L2,
    #[error("P value out of range with g10 l2")]
    PValueOutOfRangeWithG10L2,
    #[error("P word with no g4 g10 g82 g86 g88 g89")]
    PWordWithNoG4G10G82G86G88G89,
    #[error("Parameter file out of order")]
    ParameterFileOutOfOrder,
    #[error("Parameter number out of range")]
    ParameterNumberOutOfRange,
    #[error("Q word missing with g83")]
    QWordMissingWithG83,
    #[error("Q word with no g83")]
    QWordWithNoG83,
    #[error("Queue is not empty after probing")]
    QueueIsNotEmptyAfterProbing,
    #[error("R clearance plane unspecified in cycle")]
    RClearancePlaneUnspecifiedInCycle,
    #[error("R i j k words all missing for arc")]
    RIJKWordsAllMissingForArc,
    #[error("R less than x in cycle in yz plane")]
    RLessThanXInCycleInYzPlane,
    #[error("R less than y in cycle in xz plane")]
    RLessThanYInCycleInXzPlane,
    #[error("R less than z in cycle in xy plane")]
    RLessThanZInCycleInXyPlane,
    #[error("R word with no g code that uses it")]
    RWordWithNoGCodeThatUsesIt,
    #[error("Radius to end of arc differs from radius to start")]
    RadiusToEndOfArcDiffersFromRadiusToStart,
    #[error("Radius too small to reach end point")]
    RadiusTooSmallToReachEndPoint,
    #[error("Required parameter missing")]
    RequiredParameterMissing,
    #[error("Selected tool slot number too large")]
    SelectedToolSlotNumberTooLarge,
    #[error("Spindle not turning clockwise in g84")]
    SpindleNotTurningClockwiseInG84,
    #[error("Spindle not turning in g86")]
    SpindleNotTurningInG86,
    #[error("Spindle not turning in g87")]
    SpindleNotTurningInG87,
    #[error("Spindle not turning in g88")]
    SpindleNotTurningInG88,
    #[error("Start point too close to probe point")]
    StartPointTooCloseToProbePoint,
    #[error("Too many m codes on line")]
    TooManyMCodesOnLine,
    #[error("Tool length offset index too big")]
    ToolLengthOffsetIndexTooBig,
    #[error("Tool max too large")]
    ToolMaxTooLarge,
    #[error("Tool radius index too big")]
    ToolRadiusIndexTooBig,
    #[error("Tool radius not less than arc radius with comp")]
    ToolRadiusNotLessThanArcRadiusWithComp,
    #[error("Two g codes used from same modal group")]
    TwoGCodesUsedFromSameModalGroup,
    #[error("Two m codes used from same modal group")]
    TwoMCodesUsedFromSameModalGroup,
    #[error("Unable to open file")]
    UnableToOpenFile,
    #[error("Unclosed comment found")]
    UnclosedCommentFound,
    #[error("Unclosed expression")]
    UnclosedExpression,
    #[error("Unknown g code used")]
    UnknownGCodeUsed,
    #[error("Unknown m code used")]
    UnknownMCodeUsed,
    #[error("X and y words missing for arc in xy plane")]
    XAndYWordsMissingForArcInXyPlane,
    #[error("X and z words missing for arc in xz plane")]
    XAndZWordsMissingForArcInXzPlane,
    #[error("X value unspecified in yz plane canned cycle")]
    XValueUnspecifiedInYzPlaneCannedCycle,
    #[error("X y and z words all missing with g38 2")]
    XYAndZWordsAllMissingWithG382,
    #[error("Y and z words missing for arc in yz plane")]
    YAndZWordsMissingForArcInYzPlane,
    #[error("Y value unspecified in xz plane canned cycle")]
    YValueUnspecifiedInXzPlaneCannedCycle,
    #[error("Z value unspecified in xy plane canned cycle")]
    ZValueUnspecifiedInXyPlaneCannedCycle,
    #[error("Zero or negative argument to ln")]
    ZeroOrNegativeArgumentToLn,
    #[error("Zero radius arc")]
    ZeroRadiusArc,
}
