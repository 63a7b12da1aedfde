//! Integration tests for the Mach VM.
//!
//! Organized as: whole-program scenarios, call/return structure, control
//! flow, memory and globals, external calls, then properties.

use mach_common::{
    Addressing, Callee, CallingConvention, Chunk, Comparison, Condition, Function, GlobalVar,
    InitData, Instruction, MReg, Operation, Program, Signature, Ty, Value,
};
use mach_memory::MemError;
use mach_vm::{
    run, Behavior, CodeOffsetOracle, Event, EventVal, Execution, ExternalCalls, ExternalOutcome,
    Genv, Machine, ReturnAddressOracle, RunConfig, ScriptedExternals, State, Stuck,
};
use proptest::prelude::*;

// ============================================================
// Helper functions
// ============================================================

/// A function with the link in slot 0 and the return address in slot 1.
fn func(frame_size: i32, code: Vec<Instruction>) -> Function {
    func_with_slots(frame_size, 0, 1, code)
}

fn func_with_slots(frame_size: i32, link: i32, ra: i32, code: Vec<Instruction>) -> Function {
    Function {
        sig: Signature::main(),
        code,
        frame_size,
        stack_size: 0,
        link_ofs: link,
        retaddr_ofs: ra,
    }
}

fn int(n: i32, dst: MReg) -> Instruction {
    Instruction::Op {
        op: Operation::IntConst(n),
        args: vec![],
        dst,
    }
}

fn op(op: Operation, args: &[MReg], dst: MReg) -> Instruction {
    Instruction::Op {
        op,
        args: args.to_vec(),
        dst,
    }
}

fn call(name: &str) -> Instruction {
    Instruction::Call(Callee::Symbol(name.to_string()))
}

fn tailcall(name: &str) -> Instruction {
    Instruction::TailCall(Callee::Symbol(name.to_string()))
}

fn r(n: u8) -> MReg {
    MReg::r(n)
}

fn run_default(program: &Program) -> Behavior {
    run(program, &RunConfig::default()).unwrap()
}

fn exit_code(program: &Program) -> i32 {
    match run_default(program) {
        Behavior::Terminates { code, .. } => code,
        other => panic!("expected termination, got {other:?}"),
    }
}

fn went_wrong(program: &Program) -> Stuck {
    match run_default(program) {
        Behavior::GoesWrong { reason, .. } => reason,
        other => panic!("expected a stuck state, got {other:?}"),
    }
}

/// Recursive factorial of `r0`, saving its argument in slot 2.
fn factorial() -> Function {
    func(
        12,
        vec![
            Instruction::Cond {
                cond: Condition::CompImm(Comparison::Le, 1),
                args: vec![r(0)],
                target: 1,
            },
            Instruction::SetStack {
                src: r(0),
                ofs: 2,
                ty: Ty::Int,
            },
            op(Operation::AddImm(-1), &[r(0)], r(0)),
            call("fact"),
            Instruction::GetStack {
                ofs: 2,
                ty: Ty::Int,
                dst: r(1),
            },
            op(Operation::Mul, &[r(0), r(1)], r(0)),
            Instruction::Return,
            Instruction::Label(1),
            int(1, r(0)),
            Instruction::Return,
        ],
    )
}

fn factorial_program(n: i32) -> Program {
    Program::new()
        .add_function("fact", factorial())
        .add_function(
            "main",
            func(8, vec![int(n, r(0)), call("fact"), Instruction::Return]),
        )
}

/// Adds its two integer arguments and records the call.
struct Adder;

impl ExternalCalls for Adder {
    fn call(
        &mut self,
        ef: &mach_common::ExternalFunction,
        args: &[Value],
    ) -> Option<ExternalOutcome> {
        match args {
            [Value::Int(a), Value::Int(b)] => Some(ExternalOutcome::observed(
                ef,
                &[EventVal::Int(*a), EventVal::Int(*b)],
                EventVal::Int(a.wrapping_add(*b)),
            )),
            _ => None,
        }
    }
}

fn block_of(sp: Value) -> u32 {
    match sp {
        Value::Ptr { block, .. } => block,
        other => panic!("stack pointer {other} is not a pointer"),
    }
}

// ============================================================
// Scenarios
// ============================================================

#[test]
fn trivial_return_allocates_and_frees_one_frame() {
    let program = Program::new().add_function(
        "main",
        func(8, vec![int(0, r(0)), Instruction::Return]),
    );
    let (genv, mem) = Genv::load(&program).unwrap();
    let mut m = Machine::new(&genv, CallingConvention::default());
    let s0 = m.initial_state("main", mem).unwrap();

    let s1 = m.step(s0).unwrap().state;
    let State::Running { sp, .. } = &s1 else {
        panic!("expected running state");
    };
    let frame = block_of(*sp);
    assert_eq!(s1.mem().bounds(frame), Some((-8, 0)));
    assert_eq!(*sp, Value::ptr(frame, -8));

    let s2 = m.step(s1).unwrap().state;
    let s3 = m.step(s2).unwrap().state;
    assert!(s3.is_final());
    assert!(!s3.mem().is_valid(frame));
    assert_eq!(m.exit_code(&s3), Ok(Some(0)));
}

#[test]
fn call_returns_constant() {
    let program = Program::new()
        .add_function("b", func(8, vec![int(7, r(0)), Instruction::Return]))
        .add_function("main", func(8, vec![call("b"), Instruction::Return]));
    assert_eq!(exit_code(&program), 7);
}

#[test]
fn tail_call_frees_caller_before_callee_frame() {
    let program = Program::new()
        .add_function("b", func(8, vec![int(9, r(0)), Instruction::Return]))
        .add_function("main", func(8, vec![tailcall("b")]));
    let (genv, mem) = Genv::load(&program).unwrap();
    let mut m = Machine::new(&genv, CallingConvention::default());
    let s = m.initial_state("main", mem).unwrap();

    let s = m.step(s).unwrap().state;
    let a_frame = match &s {
        State::Running { sp, .. } => block_of(*sp),
        other => panic!("unexpected {other:?}"),
    };
    assert_eq!(s.depth(), 0);

    let s = m.step(s).unwrap().state;
    assert!(matches!(s, State::CallPending { .. }));
    assert_eq!(s.depth(), 0);
    assert!(!s.mem().is_valid(a_frame));

    let s = m.step(s).unwrap().state;
    let b_frame = match &s {
        State::Running { sp, .. } => block_of(*sp),
        other => panic!("unexpected {other:?}"),
    };
    assert!(b_frame > a_frame);
    assert_eq!(s.depth(), 0);

    assert_eq!(exit_code(&program), 9);
}

#[test]
fn external_call_with_register_and_stack_argument() {
    let program = Program::new()
        .add_external("sum2", Signature::new(vec![Ty::Int, Ty::Int], Some(Ty::Int)))
        .add_function(
            "main",
            func_with_slots(
                16,
                2,
                3,
                vec![
                    int(3, r(0)),
                    int(4, r(1)),
                    Instruction::SetStack {
                        src: r(1),
                        ofs: 0,
                        ty: Ty::Int,
                    },
                    call("sum2"),
                    Instruction::Return,
                ],
            ),
        );
    let (genv, mem) = Genv::load(&program).unwrap();
    let conv = CallingConvention::with_int_params(1);
    let machine = Machine::new(&genv, conv).with_externals(Adder);
    let initial = machine.initial_state("main", mem).unwrap();
    let behavior = Execution::new(machine, initial).run(1_000);

    assert_eq!(
        behavior,
        Behavior::Terminates {
            trace: vec![Event {
                name: "sum2".to_string(),
                args: vec![EventVal::Int(3), EventVal::Int(4)],
                result: EventVal::Int(7),
            }],
            code: 7,
        }
    );
}

#[test]
fn load_outside_any_block_is_stuck() {
    let program = Program::new().add_function(
        "main",
        func(
            8,
            vec![
                Instruction::Load {
                    chunk: Chunk::Int32,
                    addr: Addressing::Stack(64),
                    args: vec![],
                    dst: r(0),
                },
                Instruction::Return,
            ],
        ),
    );
    assert!(matches!(
        went_wrong(&program),
        Stuck::Memory(MemError::OutOfBounds { offset: 56, .. })
    ));

    let through_int = Program::new().add_function(
        "main",
        func(
            8,
            vec![
                int(16, r(1)),
                Instruction::Load {
                    chunk: Chunk::Int32,
                    addr: Addressing::Indexed(0),
                    args: vec![r(1)],
                    dst: r(0),
                },
                Instruction::Return,
            ],
        ),
    );
    assert_eq!(
        went_wrong(&through_int),
        Stuck::Memory(MemError::NotAPointer(Value::Int(16)))
    );
}

// ============================================================
// Calls and frames
// ============================================================

#[test]
fn recursive_factorial() {
    assert_eq!(exit_code(&factorial_program(5)), 120);
    assert_eq!(exit_code(&factorial_program(1)), 1);
}

#[test]
fn indirect_call_through_register() {
    let program = Program::new()
        .add_function("b", func(8, vec![int(11, r(0)), Instruction::Return]))
        .add_function(
            "main",
            func(
                8,
                vec![
                    op(Operation::AddrSymbol("b".to_string(), 0), &[], r(5)),
                    Instruction::Call(Callee::Reg(r(5))),
                    Instruction::Return,
                ],
            ),
        );
    assert_eq!(exit_code(&program), 11);
}

#[test]
fn callee_slot_link_holds_caller_sp_and_oracle_address() {
    let program = Program::new()
        .add_function("b", func(8, vec![Instruction::Return]))
        .add_function(
            "main",
            func(8, vec![int(0, r(0)), call("b"), Instruction::Return]),
        );
    let (genv, mem) = Genv::load(&program).unwrap();
    let main = genv.find_symbol("main").unwrap();
    let mut m = Machine::new(&genv, CallingConvention::default());
    let mut s = m.initial_state("main", mem).unwrap();

    // enter main, intconst, call
    for _ in 0..3 {
        s = m.step(s).unwrap().state;
    }
    let caller_sp = s.stack().parent_sp();
    let s = m.step(s).unwrap().state;
    let State::Running { sp, mem, .. } = &s else {
        panic!("expected callee running");
    };

    let mach_common::FunDef::Internal(main_fn) = genv.find_funct_ptr(main).unwrap() else {
        panic!("main is internal");
    };
    let expected_ra = CodeOffsetOracle
        .return_address(main, main_fn, &main_fn.code[2..])
        .unwrap();
    assert_eq!(mach_vm::frame::load_slot(mem, *sp, Ty::Int, 0), Ok(caller_sp));
    assert_eq!(
        mach_vm::frame::load_slot(mem, *sp, Ty::Int, 1),
        Ok(expected_ra)
    );
    assert_eq!(expected_ra, Value::ptr(main, 2));
}

#[test]
fn getparam_reads_caller_outgoing_slot() {
    let program = Program::new()
        .add_function(
            "b",
            func(
                8,
                vec![
                    Instruction::GetParam {
                        ofs: 0,
                        ty: Ty::Int,
                        dst: r(0),
                    },
                    Instruction::Return,
                ],
            ),
        )
        .add_function(
            "main",
            func_with_slots(
                16,
                2,
                3,
                vec![
                    int(21, r(4)),
                    Instruction::SetStack {
                        src: r(4),
                        ofs: 0,
                        ty: Ty::Int,
                    },
                    call("b"),
                    Instruction::Return,
                ],
            ),
        );
    assert_eq!(exit_code(&program), 21);
}

#[test]
fn getparam_in_entry_has_no_caller_frame() {
    let program = Program::new().add_function(
        "main",
        func(
            8,
            vec![
                Instruction::GetParam {
                    ofs: 0,
                    ty: Ty::Int,
                    dst: r(0),
                },
                Instruction::Return,
            ],
        ),
    );
    assert_eq!(
        went_wrong(&program),
        Stuck::Memory(MemError::NotAPointer(Value::NULLPTR))
    );
}

#[test]
fn float_slot_survives_call() {
    let program = Program::new()
        .add_function("b", func(8, vec![Instruction::Return]))
        .add_function(
            "main",
            func(
                16,
                vec![
                    op(Operation::FloatConst(2.5), &[], MReg::f(0)),
                    Instruction::SetStack {
                        src: MReg::f(0),
                        ofs: 2,
                        ty: Ty::Float,
                    },
                    call("b"),
                    Instruction::GetStack {
                        ofs: 2,
                        ty: Ty::Float,
                        dst: MReg::f(1),
                    },
                    op(Operation::MulF, &[MReg::f(1), MReg::f(1)], MReg::f(1)),
                    op(Operation::IntOfFloat, &[MReg::f(1)], r(0)),
                    Instruction::Return,
                ],
            ),
        );
    assert_eq!(exit_code(&program), 6);
}

#[test]
fn stale_frame_pointer_is_stuck() {
    let program = Program::new()
        .add_var("saved", GlobalVar::new(vec![InitData::Int32(0)]))
        .add_function(
            "b",
            func(
                8,
                vec![
                    op(Operation::AddrStack(0), &[], r(1)),
                    Instruction::Store {
                        chunk: Chunk::Int32,
                        addr: Addressing::Global("saved".to_string(), 0),
                        args: vec![],
                        src: r(1),
                    },
                    Instruction::Return,
                ],
            ),
        )
        .add_function(
            "main",
            func(
                8,
                vec![
                    call("b"),
                    Instruction::Load {
                        chunk: Chunk::Int32,
                        addr: Addressing::Global("saved".to_string(), 0),
                        args: vec![],
                        dst: r(1),
                    },
                    Instruction::Load {
                        chunk: Chunk::Int32,
                        addr: Addressing::Indexed(0),
                        args: vec![r(1)],
                        dst: r(0),
                    },
                    Instruction::Return,
                ],
            ),
        );
    assert!(matches!(
        went_wrong(&program),
        Stuck::Memory(MemError::InvalidBlock { .. })
    ));
}

#[test]
fn call_to_variable_is_stuck() {
    let program = Program::new()
        .add_var("g", GlobalVar::new(vec![InitData::Int32(0)]))
        .add_function("main", func(8, vec![call("g"), Instruction::Return]));
    assert!(matches!(went_wrong(&program), Stuck::NotAFunction(_)));
}

#[test]
fn unknown_callee_is_stuck() {
    let program = Program::new().add_function("main", func(8, vec![call("nowhere")]));
    assert_eq!(
        went_wrong(&program),
        Stuck::UnknownSymbol("nowhere".to_string())
    );
}

#[test]
fn oracle_without_address_blocks_calls() {
    struct Refuses;
    impl ReturnAddressOracle for Refuses {
        fn return_address(&self, _: u32, _: &Function, _: &[Instruction]) -> Option<Value> {
            None
        }
    }
    let program = Program::new()
        .add_function("b", func(8, vec![Instruction::Return]))
        .add_function("main", func(8, vec![call("b"), Instruction::Return]));
    let (genv, mem) = Genv::load(&program).unwrap();
    let machine = Machine::new(&genv, CallingConvention::default()).with_oracle(Refuses);
    let initial = machine.initial_state("main", mem).unwrap();
    assert!(matches!(
        Execution::new(machine, initial).run(100),
        Behavior::GoesWrong {
            reason: Stuck::NoReturnAddress,
            ..
        }
    ));
}

#[test]
fn undefined_exit_value_goes_wrong() {
    let program = Program::new().add_function("main", func(8, vec![Instruction::Return]));
    assert_eq!(went_wrong(&program), Stuck::BadExitValue(Value::Undef));
}

// ============================================================
// Control flow
// ============================================================

/// Sum of `0..n` with a conditional loop.
fn sum_program(n: i32) -> Program {
    Program::new().add_function(
        "main",
        func(
            8,
            vec![
                int(0, r(0)),
                int(0, r(1)),
                Instruction::Label(1),
                Instruction::Cond {
                    cond: Condition::CompImm(Comparison::Ge, n),
                    args: vec![r(1)],
                    target: 2,
                },
                op(Operation::Add, &[r(0), r(1)], r(0)),
                op(Operation::AddImm(1), &[r(1)], r(1)),
                Instruction::Goto(1),
                Instruction::Label(2),
                Instruction::Return,
            ],
        ),
    )
}

#[test]
fn conditional_loop() {
    assert_eq!(exit_code(&sum_program(10)), 45);
    assert_eq!(exit_code(&sum_program(0)), 0);
}

#[test]
fn jumptable_selects_target() {
    let select = |index: i32| {
        Program::new().add_function(
            "main",
            func(
                8,
                vec![
                    int(index, r(2)),
                    Instruction::JumpTable {
                        arg: r(2),
                        targets: vec![10, 20],
                    },
                    Instruction::Label(10),
                    int(100, r(0)),
                    Instruction::Return,
                    Instruction::Label(20),
                    int(200, r(0)),
                    Instruction::Return,
                ],
            ),
        )
    };
    assert_eq!(exit_code(&select(0)), 100);
    assert_eq!(exit_code(&select(1)), 200);
    assert_eq!(
        went_wrong(&select(-1)),
        Stuck::BadJumpTableIndex(Value::Int(-1))
    );
}

#[test]
fn goto_missing_label_is_stuck() {
    let program = Program::new().add_function("main", func(8, vec![Instruction::Goto(3)]));
    assert_eq!(went_wrong(&program), Stuck::MissingLabel(3));
}

#[test]
fn condition_on_undefined_register_is_stuck() {
    let program = Program::new().add_function(
        "main",
        func(
            8,
            vec![
                Instruction::Cond {
                    cond: Condition::Comp(Comparison::Eq),
                    args: vec![r(3), r(4)],
                    target: 1,
                },
                Instruction::Label(1),
                Instruction::Return,
            ],
        ),
    );
    assert_eq!(
        went_wrong(&program),
        Stuck::UndefinedCondition { cond: "cmp" }
    );
}

#[test]
fn infinite_loop_diverges() {
    let program = Program::new().add_function(
        "main",
        func(8, vec![Instruction::Label(1), Instruction::Goto(1)]),
    );
    let config = RunConfig {
        fuel: 500,
        ..RunConfig::default()
    };
    assert_eq!(
        run(&program, &config).unwrap(),
        Behavior::Diverges { trace: vec![] }
    );
}

#[test]
fn division_by_zero_is_stuck() {
    let program = Program::new().add_function(
        "main",
        func(
            8,
            vec![
                int(1, r(0)),
                int(0, r(1)),
                op(Operation::Divs, &[r(0), r(1)], r(0)),
                Instruction::Return,
            ],
        ),
    );
    assert_eq!(
        went_wrong(&program),
        Stuck::UndefinedOperation { op: "divs" }
    );
}

// ============================================================
// Globals and memory
// ============================================================

#[test]
fn global_counter_read_modify_write() {
    let program = Program::new()
        .add_var("counter", GlobalVar::new(vec![InitData::Int32(40)]))
        .add_function(
            "main",
            func(
                8,
                vec![
                    Instruction::Load {
                        chunk: Chunk::Int32,
                        addr: Addressing::Global("counter".to_string(), 0),
                        args: vec![],
                        dst: r(0),
                    },
                    op(Operation::AddImm(2), &[r(0)], r(0)),
                    Instruction::Store {
                        chunk: Chunk::Int32,
                        addr: Addressing::Global("counter".to_string(), 0),
                        args: vec![],
                        src: r(0),
                    },
                    Instruction::Load {
                        chunk: Chunk::Int32,
                        addr: Addressing::Global("counter".to_string(), 0),
                        args: vec![],
                        dst: r(0),
                    },
                    Instruction::Return,
                ],
            ),
        );
    assert_eq!(exit_code(&program), 42);
}

#[test]
fn based_addressing_indexes_table() {
    let program = Program::new()
        .add_var(
            "table",
            GlobalVar::new(vec![
                InitData::Int16(5),
                InitData::Int16(-6),
                InitData::Int16(7),
            ]),
        )
        .add_function(
            "main",
            func(
                8,
                vec![
                    int(2, r(1)),
                    Instruction::Load {
                        chunk: Chunk::Int16Signed,
                        addr: Addressing::Based("table".to_string(), 0),
                        args: vec![r(1)],
                        dst: r(0),
                    },
                    Instruction::Return,
                ],
            ),
        );
    assert_eq!(exit_code(&program), -6);
}

#[test]
fn stack_locals_above_reference_point() {
    let mut main = func(
        8,
        vec![
            int(13, r(1)),
            Instruction::Store {
                chunk: Chunk::Int32,
                addr: Addressing::Stack(12),
                args: vec![],
                src: r(1),
            },
            Instruction::Load {
                chunk: Chunk::Int32,
                addr: Addressing::Stack(12),
                args: vec![],
                dst: r(0),
            },
            Instruction::Return,
        ],
    );
    main.stack_size = 8;
    assert_eq!(exit_code(&Program::new().add_function("main", main)), 13);
}

#[test]
fn load_error_reported_before_running() {
    let program = Program::new()
        .add_function("main", func(8, vec![Instruction::Return]))
        .add_function("main", func(8, vec![Instruction::Return]));
    assert!(run(&program, &RunConfig::default()).is_err());

    let no_entry = Program::new()
        .add_function("start", func(8, vec![Instruction::Return]));
    assert_eq!(
        run(&no_entry, &RunConfig::default()).unwrap_err(),
        mach_vm::LoadError::MissingEntry("main".to_string())
    );
}

// ============================================================
// External calls
// ============================================================

fn print_twice() -> Program {
    Program::new()
        .add_external("print_int", Signature::new(vec![Ty::Int], Some(Ty::Int)))
        .add_function(
            "main",
            func(
                12,
                vec![
                    int(5, r(0)),
                    call("print_int"),
                    int(6, r(0)),
                    call("print_int"),
                    Instruction::Return,
                ],
            ),
        )
}

#[test]
fn host_primitives_record_trace() {
    let behavior = run_default(&print_twice());
    let printed: Vec<String> = behavior.trace().iter().map(Event::to_string).collect();
    assert_eq!(printed, vec!["print_int(5) = 0", "print_int(6) = 0"]);
    assert!(matches!(behavior, Behavior::Terminates { code: 0, .. }));
}

#[test]
fn external_without_outcome_goes_wrong_with_partial_trace() {
    let program = print_twice();
    let (genv, mem) = Genv::load(&program).unwrap();
    let machine = Machine::new(&genv, CallingConvention::default())
        .with_externals(ScriptedExternals::new([EventVal::Int(1)]));
    let initial = machine.initial_state("main", mem).unwrap();
    match Execution::new(machine, initial).run(1_000) {
        Behavior::GoesWrong { trace, reason } => {
            assert_eq!(trace.len(), 1);
            assert_eq!(
                reason,
                Stuck::ExternalCallFailed {
                    name: "print_int".to_string()
                }
            );
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn external_tail_call_returns_to_caller_of_caller() {
    let program = Program::new()
        .add_external("abs", Signature::new(vec![Ty::Int], Some(Ty::Int)))
        .add_function("b", func(8, vec![tailcall("abs")]))
        .add_function(
            "main",
            func(8, vec![int(-8, r(0)), call("b"), Instruction::Return]),
        );
    assert_eq!(exit_code(&program), 8);
}

#[test]
fn execution_reports_steps_and_depth() {
    let program = factorial_program(3);
    let (genv, mem) = Genv::load(&program).unwrap();
    let machine = Machine::new(&genv, CallingConvention::default());
    let initial = machine.initial_state("main", mem).unwrap();
    let mut exec = Execution::new(machine, initial);
    let mut max_depth = 0;
    while !exec.is_final() {
        exec.step().unwrap();
        max_depth = max_depth.max(exec.depth().unwrap());
    }
    assert_eq!(max_depth, 3);
    assert_eq!(exec.exit_code(), Ok(Some(6)));
    assert_eq!(exec.step().unwrap_err(), Stuck::Finished);
    assert!(exec.steps() > 0);
}

// ============================================================
// Properties
// ============================================================

/// Depth change of the step executing `instr` and, for returns, the
/// following return step.
fn check_stack_law(program: &Program) {
    let (genv, mem) = Genv::load(program).unwrap();
    let mut m = Machine::new(&genv, CallingConvention::default());
    let mut s = m.initial_state(&program.entry, mem).unwrap();
    while !s.is_final() {
        let before = s.depth();
        let instr = match &s {
            State::Running { func, pc, .. } => match genv.find_funct_ptr(*func) {
                Some(mach_common::FunDef::Internal(f)) => f.code.get(*pc).cloned(),
                _ => None,
            },
            _ => None,
        };
        let next = m.step(s).unwrap().state;
        match instr {
            Some(Instruction::Call(_)) => assert_eq!(next.depth(), before + 1),
            Some(Instruction::TailCall(_)) | Some(Instruction::Return) => {
                assert_eq!(next.depth(), before)
            }
            _ => {}
        }
        if let State::ReturnPending { .. } = next {
            if !next.is_final() {
                let d = next.depth();
                let resumed = m.step(next).unwrap().state;
                assert_eq!(resumed.depth(), d - 1);
                s = resumed;
                continue;
            }
        }
        s = next;
    }
}

#[test]
fn stack_depth_law_with_tail_calls() {
    let program = Program::new()
        .add_function("c", func(8, vec![int(1, r(0)), Instruction::Return]))
        .add_function("b", func(8, vec![tailcall("c")]))
        .add_function(
            "main",
            func(8, vec![call("b"), call("b"), Instruction::Return]),
        );
    check_stack_law(&program);
}

proptest! {
    #[test]
    fn factorial_matches_host(n in 1i32..10) {
        let expected: i32 = (1..=n).product();
        prop_assert_eq!(exit_code(&factorial_program(n)), expected);
    }

    #[test]
    fn stack_depth_law(n in 1i32..8) {
        check_stack_law(&factorial_program(n));
    }

    #[test]
    fn loop_sum(n in 0i32..200) {
        prop_assert_eq!(exit_code(&sum_program(n)), (0..n).sum::<i32>());
    }

    /// Two runs agree step for step until the first external call, and the
    /// external results alone account for any difference.
    #[test]
    fn deterministic_except_external_calls(a in any::<i32>(), b in any::<i32>()) {
        let program = print_twice();
        let (genv, mem) = Genv::load(&program).unwrap();
        let mk = |x: i32| {
            let machine = Machine::new(&genv, CallingConvention::default())
                .with_externals(ScriptedExternals::new([EventVal::Int(x), EventVal::Int(x)]));
            let initial = machine.initial_state("main", mem.clone()).unwrap();
            Execution::new(machine, initial)
        };
        let mut left = mk(a);
        let mut right = mk(b);
        while !left.at_external_step() {
            prop_assert_eq!(left.state(), right.state());
            left.step().unwrap();
            right.step().unwrap();
        }
        prop_assert!(right.at_external_step());

        let same = mk(a).run(1_000);
        prop_assert_eq!(&same, &mk(a).run(1_000));
        let Behavior::Terminates { trace, code } = same else {
            panic!("expected termination");
        };
        prop_assert_eq!(code, a);
        prop_assert_eq!(trace.len(), 2);
    }
}
