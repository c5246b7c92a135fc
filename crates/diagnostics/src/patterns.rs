//! The failure-pattern database
//!
//! Rules are grouped by the pass family they explain and registered in a
//! fixed order; the matcher prefers earlier rules on score ties, so the
//! specific entries of a family come before its catch-alls.

use crate::{fix, ir_fix, DiagnosticEngine, OptimizationPattern, SeverityLevel};

impl DiagnosticEngine {
    pub(crate) fn register_patterns(&mut self) {
        self.register_inlining_patterns();
        self.register_loop_vectorization_patterns();
        self.register_slp_vectorization_patterns();
        self.register_sroa_patterns();
        self.register_loop_unroll_patterns();
        self.register_tail_call_patterns();
        self.register_gvn_patterns();
        self.register_memcpy_opt_patterns();
        self.register_loop_interchange_patterns();
        self.register_generic_patterns();
    }

    fn register_inlining_patterns(&mut self) {
        self.patterns.push(OptimizationPattern {
            pass_substr: "inline",
            remark_substr: "NotInlined",
            message_substr: "too costly",
            short_reason: "Inlining rejected: callee too large",
            detailed_explanation:
                "The inliner evaluated the cost of copying the callee's body into the call \
                 site and found it would exceed the configured threshold. The cost model \
                 weighs instruction count, call overhead and attribute bonuses; when the \
                 total exceeds the inline threshold (default 225), inlining is refused to \
                 avoid binary size blowup.",
            root_cause:
                "The callee function body is too large for the inliner to justify \
                 duplicating at this call site.",
            optimizer_intent:
                "The optimizer wanted to replace the call instruction with a direct copy \
                 of the callee body, eliminating call overhead and enabling further \
                 constant propagation and dead code elimination at the call site.",
            suggestions: vec![
                fix(
                    "Mark the function __attribute__((always_inline)) to force inlining \
                     regardless of cost",
                    "__attribute__((always_inline)) int myFunc() { ... }",
                ),
                fix(
                    "Split the callee into smaller helper functions so the hot path is \
                     small enough to inline",
                    "",
                ),
                fix(
                    "Raise the inlining budget for this translation unit with \
                     -mllvm -inline-threshold=500 (or higher)",
                    "",
                ),
                ir_fix(
                    "Mark the callee with the alwaysinline attribute in the IR",
                    "fn @foo() -> i32 !alwaysinline { ... }",
                ),
            ],
            severity: SeverityLevel::High,
            estimated_speedup: 1.3,
        });

        self.patterns.push(OptimizationPattern {
            pass_substr: "inline",
            remark_substr: "NotInlined",
            message_substr: "recursive",
            short_reason: "Inlining rejected: recursive function",
            detailed_explanation:
                "The inliner never inlines recursive functions because doing so could \
                 produce infinite code duplication. Even mutual recursion (A calls B \
                 calls A) blocks inlining across the entire call chain.",
            root_cause: "The function is directly or indirectly recursive.",
            optimizer_intent:
                "The optimizer would have eliminated the call frame and replaced the call \
                 with inlined code, but recursion makes this impossible.",
            suggestions: vec![
                fix(
                    "Refactor to an iterative implementation using an explicit stack, \
                     which can then be inlined normally",
                    "",
                ),
                fix(
                    "Use trampolining / continuation-passing style for tail-recursive \
                     cases; the tail call eliminator will then handle the recursion",
                    "",
                ),
                fix(
                    "If only the base case is hot, manually inline it and dispatch to the \
                     recursive version only for the general case",
                    "",
                ),
            ],
            severity: SeverityLevel::Medium,
            estimated_speedup: 0.0,
        });

        self.patterns.push(OptimizationPattern {
            pass_substr: "inline",
            remark_substr: "NotInlined",
            message_substr: "noinline",
            short_reason: "Inlining rejected: noinline attribute present",
            detailed_explanation:
                "The function has the 'noinline' attribute set, which is an explicit \
                 programmer directive telling the inliner to never inline this function. \
                 This takes precedence over all cost heuristics.",
            root_cause:
                "The 'noinline' attribute on the function or call site is preventing the \
                 inliner from proceeding.",
            optimizer_intent:
                "The optimizer would have inlined this function to eliminate the call \
                 overhead and unlock downstream optimizations.",
            suggestions: vec![
                fix(
                    "Remove the __attribute__((noinline)) or [[gnu::noinline]] annotation \
                     from the function declaration if it was added by mistake or is no \
                     longer needed",
                    "",
                ),
                fix(
                    "If noinline was added for debugging, use a compilation flag instead \
                     so you can easily toggle it",
                    "",
                ),
                ir_fix(
                    "Remove the noinline attribute from the function definition in the IR",
                    "fn @foo() -> i32 { ... }  ; drop '!noinline' from the header",
                ),
            ],
            severity: SeverityLevel::High,
            estimated_speedup: 1.25,
        });

        self.patterns.push(OptimizationPattern {
            pass_substr: "inline",
            remark_substr: "NotInlined",
            message_substr: "indirect call",
            short_reason: "Inlining rejected: indirect call site",
            detailed_explanation:
                "The call is made through a function pointer or virtual dispatch, so the \
                 inliner cannot determine the callee statically. Indirect calls can be \
                 inlined only after devirtualization resolves the callee.",
            root_cause:
                "The call target is not known at compile time (function pointer, vtable \
                 dispatch, or unresolved symbol).",
            optimizer_intent:
                "The optimizer wanted to devirtualize the call and then inline the \
                 resolved callee to eliminate the indirect branch overhead.",
            suggestions: vec![
                fix(
                    "Use final/override on virtual methods to allow devirtualization, or \
                     seal the class",
                    "class Derived final : public Base { ... };",
                ),
                fix(
                    "Replace function pointer callbacks with templates/lambdas so the \
                     callee is known at the call site",
                    "",
                ),
                fix(
                    "Use Profile-Guided Optimization (PGO), which supplies runtime \
                     frequency data to speculatively devirtualize hot indirect calls",
                    "",
                ),
            ],
            severity: SeverityLevel::High,
            estimated_speedup: 1.5,
        });

        self.patterns.push(OptimizationPattern {
            pass_substr: "inline",
            remark_substr: "NotInlined",
            message_substr: "unavailable definition",
            short_reason: "Inlining rejected: callee definition not available",
            detailed_explanation:
                "The inliner cannot inline a function whose definition is in a different \
                 translation unit and has not been provided via LTO. When building \
                 without LTO, each object file is compiled independently and definitions \
                 across files are invisible to each other.",
            root_cause:
                "The callee is declared but not defined in this translation unit, and \
                 Link-Time Optimization (LTO) is not enabled.",
            optimizer_intent:
                "The optimizer wanted to inline the callee body but could not access the \
                 function definition.",
            suggestions: vec![
                fix(
                    "Enable Link-Time Optimization with -flto=thin or -flto=full to make \
                     cross-module inlining possible",
                    "clang -O2 -flto=thin source.cpp -o binary",
                ),
                fix(
                    "Move the function definition to a header and mark it inline, or put \
                     it in the same translation unit as its primary caller",
                    "",
                ),
                fix(
                    "Ensure the symbol is visible across module boundaries when using LTO",
                    "",
                ),
            ],
            severity: SeverityLevel::Medium,
            estimated_speedup: 1.4,
        });
    }

    fn register_loop_vectorization_patterns(&mut self) {
        self.patterns.push(OptimizationPattern {
            pass_substr: "loop-vectorize",
            remark_substr: "MissedDetails",
            message_substr: "loop not vectorized",
            short_reason: "Loop vectorization failed",
            detailed_explanation:
                "The loop vectorizer attempted to transform the scalar loop into a SIMD \
                 loop but was blocked. Vectorization requires a countable trip count, no \
                 loop-carried dependencies on the vectorized elements, no function calls \
                 with side effects inside the loop body, and no pointer aliasing between \
                 loop operands. When any of these preconditions fail, the vectorizer \
                 emits a missed remark.",
            root_cause: "One or more preconditions for loop vectorization are not satisfied.",
            optimizer_intent:
                "The optimizer wanted to transform the loop to process 4-16 elements per \
                 iteration using SIMD instructions, potentially yielding 4-8x throughput \
                 improvement on CPU-bound loops.",
            suggestions: vec![
                fix(
                    "Add __restrict__ qualifiers to pointer parameters to eliminate \
                     aliasing uncertainty",
                    "void f(float* __restrict__ a, float* __restrict__ b, int n)",
                ),
                fix(
                    "Annotate the loop with #pragma clang loop vectorize(enable) to force \
                     vectorization with safety checks",
                    "#pragma clang loop vectorize(enable)\nfor(int i=0;i<n;++i)...",
                ),
                fix(
                    "Ensure the loop has a simple induction variable and no early exits \
                     (break/continue) inside the body",
                    "",
                ),
                fix(
                    "Remove any function calls from the loop body that have unknown side \
                     effects; consider marking them with __attribute__((const))",
                    "",
                ),
            ],
            severity: SeverityLevel::High,
            estimated_speedup: 4.0,
        });

        self.patterns.push(OptimizationPattern {
            pass_substr: "loop-vectorize",
            remark_substr: "",
            message_substr: "cannot identify array bounds",
            short_reason: "Loop vectorization blocked: unknown array bounds",
            detailed_explanation:
                "The vectorizer requires knowledge of the loop trip count at the point it \
                 builds the vector loop. If pointer arithmetic is used and the distance \
                 between start and end pointers cannot be proven at compile time, the \
                 scalar remainder loop cannot be generated safely.",
            root_cause:
                "The iteration count of the loop cannot be determined statically or \
                 dynamically, blocking the vector preamble/remainder generation.",
            optimizer_intent:
                "The optimizer wanted to peel a scalar prologue to align memory, run a \
                 SIMD body for the bulk of iterations and a scalar epilogue for the \
                 remainder, but it needs a known upper bound for this.",
            suggestions: vec![
                fix(
                    "Use index-based loops with an explicit integer bound instead of \
                     pointer arithmetic",
                    "for (int i = 0; i < n; ++i)  // instead of while (p < end)",
                ),
                fix(
                    "Add __builtin_assume(n > 0 && n % 4 == 0) before the loop to provide \
                     bound information to the optimizer",
                    "",
                ),
                fix(
                    "Replace raw pointer iteration with std::span<T>, which carries size \
                     information",
                    "",
                ),
            ],
            severity: SeverityLevel::High,
            estimated_speedup: 4.0,
        });

        self.patterns.push(OptimizationPattern {
            pass_substr: "loop-vectorize",
            remark_substr: "",
            message_substr: "unsafe dependent memory operations",
            short_reason: "Loop vectorization blocked: memory dependency / aliasing",
            detailed_explanation:
                "Loop access analysis detected or could not disprove a memory-carried \
                 dependency between loop iterations. If element i of array A is read \
                 while element i+k of A is written in the same loop, vectorizing would \
                 read future writes, changing program semantics.",
            root_cause:
                "A read-after-write, write-after-read, or write-after-write dependency \
                 between iterations was found or could not be ruled out by alias \
                 analysis.",
            optimizer_intent:
                "The optimizer wanted to load/store multiple elements simultaneously \
                 using SIMD gather/scatter or contiguous loads, but the dependency \
                 prevents reordering memory operations.",
            suggestions: vec![
                fix(
                    "If you know the arrays do not alias, add __restrict__ to all pointer \
                     parameters",
                    "void f(int* __restrict__ out, const int* __restrict__ in, int n)",
                ),
                fix(
                    "Add #pragma clang loop vectorize(assume_safety) to assert there are \
                     no dependencies (only safe if you know this is true)",
                    "#pragma clang loop vectorize(assume_safety)",
                ),
                fix(
                    "If a read-after-write dependency actually exists (e.g., a[i] = \
                     a[i-1] + c), consider restructuring the loop to use a temporary \
                     buffer, or accept that the loop cannot be vectorized",
                    "",
                ),
            ],
            severity: SeverityLevel::Critical,
            estimated_speedup: 4.0,
        });

        self.patterns.push(OptimizationPattern {
            pass_substr: "loop-vectorize",
            remark_substr: "",
            message_substr: "value that could not be identified as reduction",
            short_reason: "Loop vectorization blocked: non-reducible accumulator",
            detailed_explanation:
                "The vectorizer recognizes a limited set of reduction patterns: sum, \
                 product, min, max, bitwise AND/OR/XOR. When a loop accumulates into a \
                 variable in a way that does not match these patterns (e.g., conditional \
                 updates, chains of dependent stores), the computation cannot safely be \
                 split across SIMD lanes.",
            root_cause:
                "The loop accumulator update cannot be expressed as a vectorizable \
                 reduction operation.",
            optimizer_intent:
                "The optimizer wanted to compute partial reductions in each SIMD lane and \
                 combine them with a horizontal reduction at the end of the loop.",
            suggestions: vec![
                fix(
                    "Ensure reductions use simple operators: +=, *=, &=, |=, ^= or \
                     std::min/std::max without conditionals inside",
                    "",
                ),
                fix(
                    "Replace conditional updates like 'if (x > 0) sum += x' with \
                     SIMD-friendly forms like 'sum += std::max(0, x)'",
                    "",
                ),
                fix(
                    "Split a multi-accumulator loop into separate loops, each with a \
                     single reduction variable",
                    "",
                ),
            ],
            severity: SeverityLevel::Medium,
            estimated_speedup: 3.0,
        });

        self.patterns.push(OptimizationPattern {
            pass_substr: "loop-vectorize",
            remark_substr: "",
            message_substr: "call instruction cannot be vectorized",
            short_reason: "Loop vectorization blocked: non-vectorizable function call",
            detailed_explanation:
                "A function call inside the loop body prevents vectorization. To \
                 vectorize a call, the compiler needs either a SIMD vector variant \
                 declared via #pragma omp declare simd or a known vectorizable intrinsic \
                 (sqrt, fabs, ...). Calls to opaque library functions are treated as \
                 barriers.",
            root_cause: "A function call in the loop body has no known SIMD vector variant.",
            optimizer_intent:
                "The optimizer wanted to replace the scalar function call with a \
                 vectorized intrinsic that processes all loop elements simultaneously.",
            suggestions: vec![
                fix(
                    "Replace library calls with equivalent intrinsics which have \
                     SIMD-vectorizable forms: sqrtf() instead of custom sqrt, fabsf() for \
                     fabs, etc.",
                    "",
                ),
                fix(
                    "Mark your function with #pragma omp declare simd to declare a vector \
                     variant for the loop vectorizer",
                    "#pragma omp declare simd\nfloat myFunc(float x);",
                ),
                fix(
                    "If the function has no side effects, mark it __attribute__((const)) \
                     or __attribute__((pure)) so it can be treated as a math function",
                    "",
                ),
                fix(
                    "Manually vectorize the call site by extracting the loop body into a \
                     SIMD function using intrinsics",
                    "",
                ),
            ],
            severity: SeverityLevel::High,
            estimated_speedup: 3.5,
        });
    }

    fn register_slp_vectorization_patterns(&mut self) {
        self.patterns.push(OptimizationPattern {
            pass_substr: "slp-vectorizer",
            remark_substr: "NotVectorized",
            message_substr: "",
            short_reason: "SLP vectorization failed",
            detailed_explanation:
                "The superword-level parallelism (SLP) vectorizer looks for independent \
                 scalar operations that could be packed into a single SIMD instruction. \
                 Unlike loop vectorization, SLP works on straight-line code. It fails \
                 when there are memory dependency chains between the candidate \
                 operations, when target-specific costs show vectorizing is not \
                 beneficial, or when the operations don't form a tree-shaped computation \
                 graph.",
            root_cause:
                "The scalar operations could not be packed into SIMD because of \
                 dependencies, cost model rejection, or irregular access patterns.",
            optimizer_intent:
                "The optimizer wanted to combine independent scalar arithmetic operations \
                 into a single SIMD instruction, e.g., packing four f32 adds into one \
                 vector add.",
            suggestions: vec![
                fix(
                    "Ensure independent scalar computations operate on contiguous memory \
                     (struct-of-arrays layout is more SLP-friendly than array-of-structs)",
                    "float xs[N], ys[N];  // SoA, not struct{float x,y;}[N]",
                ),
                fix(
                    "Avoid breaking operation chains with conditionals or function calls \
                     between the independent computations",
                    "",
                ),
                fix(
                    "Use #pragma clang loop unroll(full) on small loops to expose more \
                     SLP opportunities to the vectorizer",
                    "",
                ),
            ],
            severity: SeverityLevel::Medium,
            estimated_speedup: 2.0,
        });
    }

    fn register_sroa_patterns(&mut self) {
        self.patterns.push(OptimizationPattern {
            pass_substr: "sroa",
            remark_substr: "CannotSROAElement",
            message_substr: "",
            short_reason: "SROA failed: aggregate cannot be decomposed",
            detailed_explanation:
                "Scalar replacement of aggregates (SROA) decomposes stack-allocated \
                 struct or array objects into individual scalar values, enabling \
                 downstream optimizations like register allocation and load elimination. \
                 SROA fails when the address of the aggregate escapes (passed to an \
                 opaque function, stored in memory, or reinterpreted), because the \
                 aggregate must then remain a memory object.",
            root_cause:
                "The address of the stack aggregate escapes the function or is used in a \
                 way that prevents SROA from replacing it with scalars.",
            optimizer_intent:
                "The optimizer wanted to replace the allocation with individual scalar \
                 variables, one per field, enabling them to live in registers rather \
                 than stack memory.",
            suggestions: vec![
                fix(
                    "Avoid taking the address of local structs and passing it to external \
                     functions; pass fields individually instead",
                    "",
                ),
                fix(
                    "If you must pass a struct by pointer, consider using a temporary \
                     local copy instead of the original object",
                    "",
                ),
                fix(
                    "Remove memcpy calls on the struct and use field-by-field assignment \
                     instead, which SROA can handle",
                    "",
                ),
                ir_fix(
                    "Ensure the alloca is only used by load and store; any call taking \
                     the pointer blocks SROA",
                    "",
                ),
            ],
            severity: SeverityLevel::High,
            estimated_speedup: 1.5,
        });

        self.patterns.push(OptimizationPattern {
            pass_substr: "sroa",
            remark_substr: "",
            message_substr: "address taken",
            short_reason: "SROA failed: address of local variable is taken",
            detailed_explanation:
                "When a local variable's address is taken, not all reads and writes to it \
                 can be tracked through SSA form. The variable must remain as a stack \
                 slot in memory. This blocks promotion and prevents the variable from \
                 living in a register.",
            root_cause:
                "The stack slot's address escapes the current function via a pointer, \
                 preventing SROA and register promotion from eliminating it.",
            optimizer_intent:
                "The optimizer wanted to promote this stack variable to a register value \
                 and completely eliminate the allocation.",
            suggestions: vec![
                fix(
                    "Remove address-taking: if the address is only needed for a single \
                     call, restructure the call to take the value directly",
                    "",
                ),
                fix(
                    "If the address is stored in a struct, consider using an index or ID \
                     instead of a raw pointer",
                    "",
                ),
                fix(
                    "For output parameters, prefer returning values directly or using \
                     std::optional<T> / std::tuple<T,U> instead of T*",
                    "",
                ),
            ],
            severity: SeverityLevel::Medium,
            estimated_speedup: 1.4,
        });
    }

    fn register_loop_unroll_patterns(&mut self) {
        self.patterns.push(OptimizationPattern {
            pass_substr: "loop-unroll",
            remark_substr: "FullUnrollAssumed",
            message_substr: "unknown trip count",
            short_reason: "Loop unrolling skipped: trip count not statically known",
            detailed_explanation:
                "Full loop unrolling requires the loop to execute a fixed, statically \
                 known number of times. When the trip count depends on a runtime value, \
                 separate iterations cannot be generated. Partial unrolling is still \
                 possible but requires a known divisibility property.",
            root_cause:
                "The loop's iteration count is a runtime variable with no statically \
                 known value or upper bound.",
            optimizer_intent:
                "The optimizer wanted to fully unroll the loop, eliminating the branch \
                 and induction variable update overhead and exposing all loop body \
                 instructions to the instruction scheduler.",
            suggestions: vec![
                fix(
                    "If the trip count is always a small constant, use a template \
                     parameter or constexpr variable",
                    "template<int N>\nvoid process() { for (int i = 0; i < N; ++i) ... }",
                ),
                fix(
                    "Add __builtin_expect or __builtin_assume to hint the probable trip \
                     count to the optimizer",
                    "",
                ),
                fix(
                    "Use #pragma clang loop unroll_count(N) to request partial unrolling \
                     by a factor of N even without a known trip count",
                    "#pragma clang loop unroll_count(4)\nfor(int i=0; i<n; ++i)...",
                ),
            ],
            severity: SeverityLevel::Low,
            estimated_speedup: 1.15,
        });

        self.patterns.push(OptimizationPattern {
            pass_substr: "loop-unroll",
            remark_substr: "",
            message_substr: "instruction count too high",
            short_reason: "Loop unrolling rejected: code size would be too large",
            detailed_explanation:
                "The loop unroller uses a cost model to estimate the instruction count \
                 after unrolling. If unrolling by factor F would produce more \
                 instructions than the unroll threshold allows, the unroll is rejected. \
                 This prevents binary bloat and instruction cache pressure.",
            root_cause:
                "Unrolling the loop body would produce too many instructions, exceeding \
                 the unroll threshold.",
            optimizer_intent:
                "The optimizer wanted to replicate the loop body N times to reduce branch \
                 overhead and improve the instruction scheduler's window.",
            suggestions: vec![
                fix(
                    "Request a smaller unroll factor with #pragma clang loop \
                     unroll_count(2)",
                    "#pragma clang loop unroll_count(2)",
                ),
                fix(
                    "Simplify the loop body to reduce its instruction count, making full \
                     unrolling feasible",
                    "",
                ),
                fix(
                    "Control the maximum unroll factor globally with \
                     -mllvm -unroll-max-count=8",
                    "",
                ),
            ],
            severity: SeverityLevel::Low,
            estimated_speedup: 1.1,
        });
    }

    fn register_tail_call_patterns(&mut self) {
        self.patterns.push(OptimizationPattern {
            pass_substr: "tailcallelim",
            remark_substr: "UnableToTransform",
            message_substr: "",
            short_reason: "Tail call elimination failed",
            detailed_explanation:
                "Tail call elimination converts a recursive call in tail position into a \
                 jump, eliminating stack frame growth. It requires the call to be in \
                 strict tail position (no computation after it), matching calling \
                 conventions, no live stack values needed after the call, and no \
                 arguments that would be clobbered by reusing the frame.",
            root_cause:
                "The call is not in proper tail position, or there are live values on the \
                 stack needed after the call, or calling conventions differ.",
            optimizer_intent:
                "The optimizer wanted to replace the recursive call with a jump to the \
                 function's entry block, turning recursion into an efficient loop \
                 without stack growth.",
            suggestions: vec![
                fix(
                    "Ensure the recursive call is the very last operation: return f(n-1) \
                     not return f(n-1) + 1",
                    "int f(int n) { return n <= 0 ? base : f(n-1); }  // good tail position",
                ),
                fix(
                    "Move accumulator updates into extra parameters (accumulator-passing \
                     style) so the tail call is the final expression",
                    "int f(int n, int acc) { return n == 0 ? acc : f(n-1, acc+n); }",
                ),
                fix(
                    "Mark the call [[clang::musttail]] if you require guaranteed \
                     elimination; the compiler then errors when it cannot comply instead \
                     of silently falling back",
                    "",
                ),
            ],
            severity: SeverityLevel::Medium,
            estimated_speedup: 1.3,
        });
    }

    fn register_gvn_patterns(&mut self) {
        self.patterns.push(OptimizationPattern {
            pass_substr: "gvn",
            remark_substr: "LoadElim",
            message_substr: "",
            short_reason: "GVN failed to eliminate redundant load",
            detailed_explanation:
                "Global value numbering (GVN) eliminates redundant loads by proving that \
                 two loads from the same address return the same value. The proof \
                 requires no intervening stores to the same or aliasing address, no \
                 function calls that could modify the location, and a dominator \
                 relationship between the two loads.",
            root_cause:
                "An intervening store, aliased write, or unknown function call prevents \
                 GVN from proving the load is redundant.",
            optimizer_intent:
                "The optimizer wanted to replace the second load with the \
                 already-computed value from the first load, eliminating the memory \
                 access.",
            suggestions: vec![
                fix(
                    "Cache loaded values in local variables to make the redundancy \
                     syntactically obvious",
                    "int v = *ptr;  use(v); use(v);  // instead of use(*ptr); use(*ptr)",
                ),
                fix(
                    "Mark functions that don't modify memory as __attribute__((pure)) or \
                     __attribute__((const)) to prevent them from blocking GVN",
                    "",
                ),
                fix(
                    "Use __restrict__ on pointers to allow alias analysis to prove the \
                     locations don't overlap",
                    "",
                ),
            ],
            severity: SeverityLevel::Medium,
            estimated_speedup: 1.2,
        });
    }

    fn register_memcpy_opt_patterns(&mut self) {
        self.patterns.push(OptimizationPattern {
            pass_substr: "memcpyopt",
            remark_substr: "",
            message_substr: "",
            short_reason: "MemCpyOpt failed to optimize memory copy",
            detailed_explanation:
                "The memcpy optimizer looks for patterns like a series of scalar stores \
                 followed by a use of those values via a copy, and tries to merge them \
                 into a single memcpy. It also tries to eliminate redundant copy chains \
                 (A -> B -> C becomes A -> C). These transforms require the source and \
                 destination to not alias, the copy to cover the full object, and no \
                 intervening modifications.",
            root_cause:
                "Aliasing, partial copies, or intervening modifications prevent the \
                 memory copy optimization.",
            optimizer_intent:
                "The optimizer wanted to merge or eliminate memory copy operations to \
                 reduce unnecessary data movement.",
            suggestions: vec![
                fix("Use __restrict__ on pointers to enable aliasing proof", ""),
                fix(
                    "Ensure struct copies use value assignment (a = b) rather than \
                     byte-level memcpy for better optimization opportunities",
                    "",
                ),
                fix(
                    "Pass destination buffers directly to the producer instead of using \
                     an intermediate buffer",
                    "",
                ),
            ],
            severity: SeverityLevel::Low,
            estimated_speedup: 1.1,
        });
    }

    fn register_loop_interchange_patterns(&mut self) {
        self.patterns.push(OptimizationPattern {
            pass_substr: "loop-interchange",
            remark_substr: "",
            message_substr: "",
            short_reason: "Loop interchange failed",
            detailed_explanation:
                "Loop interchange reorders nested loops to improve memory locality \
                 (making the innermost loop access memory sequentially). This requires \
                 the loop nest to be perfectly nested (no code between loop headers), \
                 the loops to be interchangeable without changing semantics (checked via \
                 dependency analysis), and both loops to share an induction variable \
                 dependency.",
            root_cause:
                "The loop nest is not perfectly nested, has disqualifying dependencies, \
                 or the interchange is not profitable according to the cost model.",
            optimizer_intent:
                "The optimizer wanted to swap the loop order to make the inner loop \
                 stride-1 through memory, improving cache line utilization.",
            suggestions: vec![
                fix(
                    "Make the loop nest perfectly nested: remove all statements between \
                     the outer and inner loop headers",
                    "for(i) { for(j) { body; } }  // no stmts between for-loops",
                ),
                fix(
                    "Change array access from A[j][i] to A[i][j] in the source to \
                     manually achieve the cache-friendly access pattern",
                    "",
                ),
                fix(
                    "Use row-major (C-style) array storage and ensure the innermost loop \
                     iterates over the last index",
                    "",
                ),
            ],
            severity: SeverityLevel::Medium,
            estimated_speedup: 2.0,
        });
    }

    fn register_generic_patterns(&mut self) {
        self.patterns.push(OptimizationPattern {
            pass_substr: "",
            remark_substr: "NeverInline",
            message_substr: "",
            short_reason: "Optimization blocked by attribute",
            detailed_explanation:
                "An explicit attribute on the function or call site is preventing the \
                 optimization from being applied. Programmer annotations are the final \
                 authority over the optimizer's heuristics.",
            root_cause:
                "An explicit attribute (noinline, optnone, volatile, etc.) overrides the \
                 optimizer's decision.",
            optimizer_intent:
                "The optimizer identified a beneficial transformation but an explicit \
                 annotation prevented it from being applied.",
            suggestions: vec![fix(
                "Review whether the attribute is still necessary; remove it if it was \
                 added for debugging or as a temporary workaround",
                "",
            )],
            severity: SeverityLevel::High,
            estimated_speedup: 1.2,
        });

        self.patterns.push(OptimizationPattern {
            pass_substr: "",
            remark_substr: "",
            message_substr: "optnone",
            short_reason: "Optimization skipped: optnone function",
            detailed_explanation:
                "The function was compiled with -O0 or carries the optnone annotation, \
                 which completely disables all IR optimizations for that function. This \
                 is typically used during debugging to prevent the optimizer from \
                 eliminating variables or reordering operations.",
            root_cause: "The 'optnone' attribute on the function disables all optimizations.",
            optimizer_intent:
                "The optimizer skipped all transformations for this function because \
                 'optnone' was set.",
            suggestions: vec![
                fix(
                    "Remove __attribute__((optnone)) from the function, or compile \
                     without -O0 for production builds",
                    "",
                ),
                fix(
                    "Use __attribute__((noinline)) to prevent inlining into other \
                     functions while still allowing optimization of the function body",
                    "",
                ),
            ],
            severity: SeverityLevel::Critical,
            estimated_speedup: 2.0,
        });

        self.patterns.push(OptimizationPattern {
            pass_substr: "gvn",
            remark_substr: "LoadClobbered",
            message_substr: "",
            short_reason: "Global Value Numbering failed: load clobbered by store",
            detailed_explanation:
                "The optimizer found a load that could potentially be replaced by a \
                 previous value (redundant load elimination), but a store instruction \
                 might modify the memory location between the source and the load. This \
                 is often caused by pointer aliasing uncertainty.",
            root_cause:
                "A store instruction clobbers the memory location of a load, preventing \
                 redundant load elimination.",
            optimizer_intent:
                "The optimizer wanted to eliminate the load instruction and reuse a value \
                 already in a register.",
            suggestions: vec![
                fix(
                    "Use __restrict__ if you know the store does not affect the load's \
                     pointer",
                    "",
                ),
                fix("Hoist the load before the store if they are independent", ""),
            ],
            severity: SeverityLevel::Medium,
            estimated_speedup: 1.2,
        });

        self.patterns.push(OptimizationPattern {
            pass_substr: "loop-vectorize",
            remark_substr: "",
            message_substr: "Cannot vectorize potentially faulting early exit loop",
            short_reason: "Loop Vectorization failed: Non-canonical early exit",
            detailed_explanation:
                "The loop contains a conditional break, return or goto that exits before \
                 the induction variable reaches its end. SIMD lanes cannot easily handle \
                 unpredictable exits without specialized predication support, which \
                 forces a fall back to scalar execution to ensure correctness and avoid \
                 faults.",
            root_cause: "An early-exit branch inside the loop body blocks vectorization.",
            optimizer_intent:
                "The vectorizer wanted to process multiple iterations in parallel, but \
                 cannot guarantee safety when iterations might stop prematurely.",
            suggestions: vec![
                fix(
                    "Restructure the loop to avoid early exits; use a boolean flag or \
                     sentinel value and process it after the loop if possible",
                    "",
                ),
                fix(
                    "Consider algorithms like std::find_if, which may have internal \
                     optimizations for such patterns",
                    "",
                ),
                fix(
                    "Try to hoist the early-exit check if it depends on data invariant to \
                     the loop",
                    "",
                ),
            ],
            severity: SeverityLevel::High,
            estimated_speedup: 3.5,
        });

        self.patterns.push(OptimizationPattern {
            pass_substr: "inline",
            remark_substr: "NoDefinition",
            message_substr: "",
            short_reason: "Inlining failed: No function definition available",
            detailed_explanation:
                "The inliner cannot inline a function if its body is not available in the \
                 current translation unit. This happens for functions defined in other \
                 source files or external libraries, unless Link Time Optimization (LTO) \
                 is enabled.",
            root_cause: "The function body is missing in the current module.",
            optimizer_intent:
                "The optimizer wanted to eliminate the call overhead by copying the \
                 function body into the caller.",
            suggestions: vec![
                fix("Enable Link Time Optimization (LTO) with -flto", ""),
                fix("Move the function definition to a header or the same file", ""),
            ],
            severity: SeverityLevel::Medium,
            estimated_speedup: 1.3,
        });
    }
}
