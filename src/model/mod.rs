pub mod attendance;
pub mod faculty;
pub mod faculty_leave;
pub mod student;
pub mod substitution;
pub mod syllabus;
pub mod timetable;
pub mod transfer;
